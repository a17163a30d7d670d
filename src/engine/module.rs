//! Dynamically loaded engine module
//!
//! Loads the engine library, resolves its three entry points, and forwards
//! calls through them.

use libloading::Library;
use std::ffi::{CString, OsString};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::dpi::ensure_dpi_awareness;
use super::ffi::{
    self, GvCpuid, InitWadFn, ReadCpuidFn, RunRenderingTestsFn, INIT_WAD_SYMBOL,
    READ_CPUID_SYMBOL, RUN_RENDERING_TESTS_SYMBOL,
};
use super::{CpuInfo, EngineError, EngineLoader, RawResultChain, RenderingEngine};
use crate::payload::Payload;

/// Base name of the engine library
pub const ENGINE_LIBRARY: &str = "infogl";

/// Platform file name of the engine library (`infogl.dll`, `libinfogl.so`, ...)
pub fn default_module_name() -> OsString {
    libloading::library_filename(ENGINE_LIBRARY)
}

/// Engine backed by a loaded module
pub struct DynamicEngine {
    read_cpuid: ReadCpuidFn,
    init_wad: InitWadFn,
    run_tests: RunRenderingTestsFn,
    path: PathBuf,
    // Must outlive the entry points above.
    _library: Library,
}

impl DynamicEngine {
    /// Load the module at `path` and resolve all entry points
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        ensure_dpi_awareness();

        debug!("Loading engine module {}", path.display());
        // SAFETY: loading runs the module's initializers; the engine module is
        // a trusted component shipped alongside this host.
        let library = unsafe { Library::new(path) }.map_err(|e| EngineError::EngineUnavailable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let read_cpuid = resolve::<ReadCpuidFn>(&library, path, READ_CPUID_SYMBOL)?;
        let init_wad = resolve::<InitWadFn>(&library, path, INIT_WAD_SYMBOL)?;
        let run_tests = resolve::<RunRenderingTestsFn>(&library, path, RUN_RENDERING_TESTS_SYMBOL)?;

        info!("Loaded engine module {}", path.display());
        Ok(Self {
            read_cpuid,
            init_wad,
            run_tests,
            path: path.to_path_buf(),
            _library: library,
        })
    }
}

fn resolve<T: Copy>(library: &Library, path: &Path, symbol: &[u8]) -> Result<T, EngineError> {
    // SAFETY: the symbol types in `ffi` match the exported C prototypes.
    unsafe { library.get::<T>(symbol) }
        .map(|s| *s)
        .map_err(|e| EngineError::EngineUnavailable {
            path: path.display().to_string(),
            reason: format!(
                "missing entry point {}: {}",
                String::from_utf8_lossy(symbol.strip_suffix(b"\0").unwrap_or(symbol)),
                e
            ),
        })
}

impl RenderingEngine for DynamicEngine {
    fn query_capabilities(&self) -> CpuInfo {
        let mut raw = GvCpuid::default();
        // SAFETY: raw is a valid, writable gvCpuid; the strings the engine
        // stores in it are owned by the engine and outlive this call.
        unsafe {
            (self.read_cpuid)(&mut raw);
            raw.to_cpu_info()
        }
    }

    fn initialize_resources(&mut self, resource_path: &Path) -> Result<(), EngineError> {
        let path_str = resource_path
            .to_str()
            .ok_or_else(|| EngineError::InvalidPath(resource_path.display().to_string()))?;
        let c_path = CString::new(path_str)
            .map_err(|_| EngineError::InvalidPath(resource_path.display().to_string()))?;

        // SAFETY: c_path is NUL-terminated and lives across the call.
        let code = unsafe { (self.init_wad)(c_path.as_ptr()) };
        if code < 0 {
            return Err(EngineError::ResourceInitFailed {
                path: path_str.to_string(),
                code,
            });
        }

        debug!("Resource package {} loaded ({})", path_str, code);
        Ok(())
    }

    fn invoke(&mut self, payload: &Payload) -> Result<RawResultChain, EngineError> {
        let c_payload = CString::new(payload.as_str())
            .map_err(|e| EngineError::InvalidPayload(e.nul_position()))?;

        // SAFETY: c_payload is NUL-terminated and lives across the call. The
        // returned chain is owned by the engine and copied before the next call.
        unsafe {
            let head = (self.run_tests)(c_payload.as_ptr());
            if head.is_null() {
                return Err(EngineError::NoResultReturned);
            }
            Ok(ffi::read_chain(head))
        }
    }
}

impl Drop for DynamicEngine {
    fn drop(&mut self) {
        debug!("Unloading engine module {}", self.path.display());
    }
}

/// Loads the engine from a module file
#[derive(Clone, Debug)]
pub struct ModuleLoader {
    module_path: PathBuf,
}

impl ModuleLoader {
    pub fn new(module_path: impl Into<PathBuf>) -> Self {
        Self {
            module_path: module_path.into(),
        }
    }

    /// Module with the default file name inside `engine_dir` (or the
    /// library search path when no directory is given)
    pub fn in_dir(engine_dir: Option<&Path>, module_name: Option<&str>) -> Self {
        let name = module_name
            .map(OsString::from)
            .unwrap_or_else(default_module_name);
        match engine_dir {
            Some(dir) if !dir.as_os_str().is_empty() => Self::new(dir.join(name)),
            _ => Self::new(name),
        }
    }

    pub fn module_path(&self) -> &Path {
        &self.module_path
    }
}

impl EngineLoader for ModuleLoader {
    type Engine = DynamicEngine;

    fn load(&self) -> Result<DynamicEngine, EngineError> {
        DynamicEngine::load(self.module_path())
    }

    fn describe(&self) -> String {
        self.module_path().display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_module_name() {
        let name = default_module_name();
        let name = name.to_string_lossy();
        assert!(name.contains("infogl"));
        #[cfg(windows)]
        assert_eq!(name, "infogl.dll");
    }

    #[test]
    fn test_loader_paths() {
        let loader = ModuleLoader::in_dir(Some(Path::new("/opt/glview")), Some("custom.so"));
        assert_eq!(loader.module_path(), Path::new("/opt/glview/custom.so"));

        let loader = ModuleLoader::in_dir(None, Some("custom.so"));
        assert_eq!(loader.module_path(), Path::new("custom.so"));

        let loader = ModuleLoader::in_dir(Some(Path::new("")), None);
        assert_eq!(loader.module_path().as_os_str(), default_module_name());
    }

    #[test]
    fn test_missing_module_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ModuleLoader::new(dir.path().join("no-such-engine.so"));

        match loader.load() {
            Err(EngineError::EngineUnavailable { path, .. }) => {
                assert!(path.contains("no-such-engine"));
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("module should not load"),
        }
    }
}
