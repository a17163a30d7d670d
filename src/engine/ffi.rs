//! C layout of the engine interface
//!
//! Mirrors of the records exchanged with the engine module and the
//! signatures of its exported entry points.

use std::ffi::{c_char, c_int, CStr};
use std::ptr;

use super::{CpuInfo, RawResultChain, RawTestRecord};

pub const READ_CPUID_SYMBOL: &[u8] = b"oevReadCpuid\0";
pub const INIT_WAD_SYMBOL: &[u8] = b"oevInitWad\0";
pub const RUN_RENDERING_TESTS_SYMBOL: &[u8] = b"oevRunRenderingTests\0";

pub type ReadCpuidFn = unsafe extern "C" fn(*mut GvCpuid);
pub type InitWadFn = unsafe extern "C" fn(*const c_char) -> c_int;
pub type RunRenderingTestsFn = unsafe extern "C" fn(*const c_char) -> *mut GvRenderingTestResult;

/// Processor description filled in by `oevReadCpuid`
#[repr(C)]
#[derive(Debug)]
pub struct GvCpuid {
    pub name: *mut c_char,
    pub code_name: *mut c_char,
    pub package: *mut c_char,
    pub vendor_name: *mut c_char,
    pub specification: *mut c_char,
    pub technology: *mut c_char,
    pub instructions: *mut c_char,
    pub max_tdp: c_int,
    pub stepping: c_int,
    pub revision: c_int,
    pub model: c_int,
    pub family: c_int,
    pub ext_model: c_int,
    pub ext_family: c_int,
    pub signature: c_int,
    pub freq_ghz: c_int,
    pub freq_mhz: c_int,
    pub ram_bytes: c_int,
    pub cores: c_int,
    pub threads: c_int,
}

impl Default for GvCpuid {
    fn default() -> Self {
        Self {
            name: ptr::null_mut(),
            code_name: ptr::null_mut(),
            package: ptr::null_mut(),
            vendor_name: ptr::null_mut(),
            specification: ptr::null_mut(),
            technology: ptr::null_mut(),
            instructions: ptr::null_mut(),
            max_tdp: 0,
            stepping: 0,
            revision: 0,
            model: 0,
            family: 0,
            ext_model: 0,
            ext_family: 0,
            signature: 0,
            freq_ghz: 0,
            freq_mhz: 0,
            ram_bytes: 0,
            cores: 0,
            threads: 0,
        }
    }
}

impl GvCpuid {
    /// Copy into an owned `CpuInfo`.
    ///
    /// # Safety
    /// Every non-null string pointer must reference a NUL-terminated string
    /// that stays valid for the duration of the call.
    pub unsafe fn to_cpu_info(&self) -> CpuInfo {
        CpuInfo {
            name: read_c_string(self.name),
            code_name: read_c_string(self.code_name),
            package: read_c_string(self.package),
            vendor_name: read_c_string(self.vendor_name),
            specification: read_c_string(self.specification),
            technology: read_c_string(self.technology),
            instructions: read_c_string(self.instructions),
            max_tdp: self.max_tdp,
            stepping: self.stepping,
            revision: self.revision,
            model: self.model,
            family: self.family,
            ext_model: self.ext_model,
            ext_family: self.ext_family,
            signature: self.signature,
            freq_ghz: self.freq_ghz,
            freq_mhz: self.freq_mhz,
            ram_bytes: self.ram_bytes,
            cores: self.cores,
            threads: self.threads,
        }
    }
}

/// Result record returned by `oevRunRenderingTests`
#[repr(C)]
#[derive(Debug)]
pub struct GvRenderingTestResult {
    pub struct_size: c_int,
    pub index: c_int,
    pub duration: c_int,
    pub fps: f32,
    pub result: *const c_char,
    pub next: *mut GvRenderingTestResult,
}

/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
pub unsafe fn read_c_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
    }
}

/// Copy a result chain into owned records, following `next` until null.
///
/// The engine keeps ownership of the records.
///
/// # Safety
/// `head` must be null or point to a valid record whose `next` links form a
/// null-terminated list of valid records.
pub unsafe fn read_chain(head: *const GvRenderingTestResult) -> RawResultChain {
    let mut records = Vec::new();
    let mut current = head;

    while let Some(record) = current.as_ref() {
        records.push(RawTestRecord {
            index: record.index,
            duration: record.duration,
            fps: record.fps,
            status: read_c_string(record.result),
        });
        current = record.next as *const GvRenderingTestResult;
    }

    RawResultChain::new(records)
}
