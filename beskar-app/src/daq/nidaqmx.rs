//! NI-DAQmx binding
//!
//! The driver library is loaded at runtime so the application still starts
//! (in mocked mode, or to report the missing driver) on machines without
//! NI-DAQmx installed. Every operation creates a task, configures a single
//! channel, performs the transfer and clears the task again.

use std::ffi::{c_char, c_void, CStr, CString};
use std::ptr;

use libloading::Library;
use log::*;

use beskar_hal::{
    AnalogInput, AnalogInputChannel, AnalogOutput, AnalogOutputChannel, DaqError, DigitalLine,
    DigitalOutput, VoltageRange,
};

#[cfg(target_os = "windows")]
const LIBRARY_NAME: &str = "nicaiu.dll";
#[cfg(not(target_os = "windows"))]
const LIBRARY_NAME: &str = "libnidaqmx.so";

type TaskHandle = *mut c_void;

// Driver constants (NIDAQmx.h)
const VAL_CFG_DEFAULT: i32 = -1;
const VAL_VOLTS: i32 = 10348;
const VAL_GROUP_BY_CHANNEL: u32 = 0;
const VAL_CHAN_FOR_ALL_LINES: i32 = 1;
const ERROR_PHYSICAL_CHAN_DOES_NOT_EXIST: i32 = -200170;

/// Seconds to wait for a finite read or a write to complete
const TIMEOUT_S: f64 = 10.0;

type CreateTaskFn = unsafe extern "system" fn(*const c_char, *mut TaskHandle) -> i32;
type ClearTaskFn = unsafe extern "system" fn(TaskHandle) -> i32;
type CreateAiVoltageChanFn = unsafe extern "system" fn(
    TaskHandle,
    *const c_char,
    *const c_char,
    i32,
    f64,
    f64,
    i32,
    *const c_char,
) -> i32;
type ReadAnalogF64Fn = unsafe extern "system" fn(
    TaskHandle,
    i32,
    f64,
    u32,
    *mut f64,
    u32,
    *mut i32,
    *mut u32,
) -> i32;
type CreateAoVoltageChanFn = unsafe extern "system" fn(
    TaskHandle,
    *const c_char,
    *const c_char,
    f64,
    f64,
    i32,
    *const c_char,
) -> i32;
type WriteAnalogScalarF64Fn = unsafe extern "system" fn(TaskHandle, u32, f64, f64, *mut u32) -> i32;
type CreateDoChanFn = unsafe extern "system" fn(TaskHandle, *const c_char, *const c_char, i32) -> i32;
type WriteDigitalLinesFn = unsafe extern "system" fn(
    TaskHandle,
    i32,
    u32,
    f64,
    u32,
    *const u8,
    *mut i32,
    *mut u32,
) -> i32;
type GetSysDevNamesFn = unsafe extern "system" fn(*mut c_char, u32) -> i32;
type GetExtendedErrorInfoFn = unsafe extern "system" fn(*mut c_char, u32) -> i32;

/// Entry points resolved from the driver library
struct Api {
    create_task: CreateTaskFn,
    clear_task: ClearTaskFn,
    create_ai_voltage_chan: CreateAiVoltageChanFn,
    read_analog_f64: ReadAnalogF64Fn,
    create_ao_voltage_chan: CreateAoVoltageChanFn,
    write_analog_scalar_f64: WriteAnalogScalarF64Fn,
    create_do_chan: CreateDoChanFn,
    write_digital_lines: WriteDigitalLinesFn,
    get_sys_dev_names: GetSysDevNamesFn,
    get_extended_error_info: GetExtendedErrorInfoFn,
}

impl Api {
    fn load(lib: &Library) -> Result<Self, libloading::Error> {
        // SAFETY: the signatures match the NI-DAQmx C API, and the pointers
        // are only used while `lib` stays loaded (held next to them).
        unsafe {
            Ok(Self {
                create_task: *lib.get::<CreateTaskFn>(b"DAQmxCreateTask\0")?,
                clear_task: *lib.get::<ClearTaskFn>(b"DAQmxClearTask\0")?,
                create_ai_voltage_chan: *lib
                    .get::<CreateAiVoltageChanFn>(b"DAQmxCreateAIVoltageChan\0")?,
                read_analog_f64: *lib.get::<ReadAnalogF64Fn>(b"DAQmxReadAnalogF64\0")?,
                create_ao_voltage_chan: *lib
                    .get::<CreateAoVoltageChanFn>(b"DAQmxCreateAOVoltageChan\0")?,
                write_analog_scalar_f64: *lib
                    .get::<WriteAnalogScalarF64Fn>(b"DAQmxWriteAnalogScalarF64\0")?,
                create_do_chan: *lib.get::<CreateDoChanFn>(b"DAQmxCreateDOChan\0")?,
                write_digital_lines: *lib.get::<WriteDigitalLinesFn>(b"DAQmxWriteDigitalLines\0")?,
                get_sys_dev_names: *lib.get::<GetSysDevNamesFn>(b"DAQmxGetSysDevNames\0")?,
                get_extended_error_info: *lib
                    .get::<GetExtendedErrorInfoFn>(b"DAQmxGetExtendedErrorInfo\0")?,
            })
        }
    }

    /// Turn a driver status into a result, logging the driver's message
    fn check(&self, status: i32) -> Result<(), DaqError> {
        if status == 0 {
            return Ok(());
        }

        let mut buf = [0 as c_char; 2048];
        // SAFETY: the driver writes at most `buf.len()` bytes, NUL terminated
        let message = unsafe {
            (self.get_extended_error_info)(buf.as_mut_ptr(), buf.len() as u32);
            CStr::from_ptr(buf.as_ptr()).to_string_lossy().into_owned()
        };

        if status > 0 {
            warn!("NI-DAQmx warning {}: {}", status, message);
            return Ok(());
        }

        error!("NI-DAQmx error {}: {}", status, message);
        match status {
            ERROR_PHYSICAL_CHAN_DOES_NOT_EXIST => Err(DaqError::InvalidChannel),
            code => Err(DaqError::Driver(code)),
        }
    }
}

/// A driver task, cleared on drop
struct Task<'a> {
    api: &'a Api,
    handle: TaskHandle,
}

impl<'a> Task<'a> {
    fn new(api: &'a Api) -> Result<Self, DaqError> {
        let mut handle: TaskHandle = ptr::null_mut();
        // SAFETY: an empty name asks the driver to generate one
        let status = unsafe { (api.create_task)(c"".as_ptr(), &mut handle) };
        api.check(status)?;
        Ok(Self { api, handle })
    }
}

impl Drop for Task<'_> {
    fn drop(&mut self) {
        // SAFETY: `handle` came from DAQmxCreateTask and is cleared once
        let status = unsafe { (self.api.clear_task)(self.handle) };
        if status < 0 {
            warn!("Failed to clear NI-DAQmx task ({})", status);
        }
    }
}

/// Split the driver's comma-separated device list
pub fn parse_device_names(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

/// An NI-DAQmx device
pub struct NiDaqmx {
    api: Api,
    device: String,
    _lib: Library,
}

impl NiDaqmx {
    fn load_library() -> Result<(Library, Api), DaqError> {
        // SAFETY: loading the vendor driver runs its initialisers, which
        // have no preconditions on our side
        let lib = unsafe { Library::new(LIBRARY_NAME) }.map_err(|e| {
            debug!("Failed to load {}: {}", LIBRARY_NAME, e);
            DaqError::DriverMissing
        })?;
        let api = Api::load(&lib).map_err(|e| {
            warn!("{} is missing an entry point: {}", LIBRARY_NAME, e);
            DaqError::DriverMissing
        })?;
        Ok((lib, api))
    }

    fn device_names(api: &Api) -> Result<Vec<String>, DaqError> {
        let mut buf = [0 as c_char; 1024];
        // SAFETY: the driver writes at most `buf.len()` bytes, NUL terminated
        let status = unsafe { (api.get_sys_dev_names)(buf.as_mut_ptr(), buf.len() as u32) };
        api.check(status)?;
        // SAFETY: see above
        let list = unsafe { CStr::from_ptr(buf.as_ptr()) };
        Ok(parse_device_names(&list.to_string_lossy()))
    }

    /// Names of the attached devices
    pub fn devices() -> Result<Vec<String>, DaqError> {
        let (_lib, api) = Self::load_library()?;
        Self::device_names(&api)
    }

    /// Open `device`, or the first attached device
    pub fn open(device: Option<&str>) -> Result<Self, DaqError> {
        let (lib, api) = Self::load_library()?;
        let names = Self::device_names(&api)?;

        let device = match device {
            Some(wanted) => names
                .into_iter()
                .find(|name| name == wanted)
                .ok_or(DaqError::DeviceNotFound)?,
            None => names.into_iter().next().ok_or(DaqError::DeviceNotFound)?,
        };
        info!("Using NI-DAQmx device {}", device);

        Ok(Self {
            api,
            device,
            _lib: lib,
        })
    }

    /// Device name, e.g. `Dev1`
    pub fn name(&self) -> &str {
        &self.device
    }

    fn physical(&self, channel: impl core::fmt::Display) -> Result<CString, DaqError> {
        CString::new(format!("{}/{}", self.device, channel)).map_err(|_| DaqError::InvalidChannel)
    }
}

impl AnalogInput for &NiDaqmx {
    fn read_samples(
        &mut self,
        channel: AnalogInputChannel,
        range: VoltageRange,
        samples: &mut [f64],
    ) -> Result<(), DaqError> {
        let api = &self.api;
        let name = self.physical(channel)?;
        let task = Task::new(api)?;
        let requested = i32::try_from(samples.len()).map_err(|_| DaqError::OutOfRange)?;
        let mut read: i32 = 0;

        // SAFETY: `samples` outlives the call and its length is passed
        // as the buffer size
        unsafe {
            api.check((api.create_ai_voltage_chan)(
                task.handle,
                name.as_ptr(),
                c"".as_ptr(),
                VAL_CFG_DEFAULT,
                range.min,
                range.max,
                VAL_VOLTS,
                ptr::null(),
            ))?;
            api.check((api.read_analog_f64)(
                task.handle,
                requested,
                TIMEOUT_S,
                VAL_GROUP_BY_CHANNEL,
                samples.as_mut_ptr(),
                samples.len() as u32,
                &mut read,
                ptr::null_mut(),
            ))?;
        }

        if read != requested {
            return Err(DaqError::ShortRead);
        }
        Ok(())
    }
}

impl AnalogOutput for &NiDaqmx {
    fn write_voltage(
        &mut self,
        channel: AnalogOutputChannel,
        range: VoltageRange,
        volts: f64,
    ) -> Result<(), DaqError> {
        if !range.contains(volts) {
            return Err(DaqError::OutOfRange);
        }

        let api = &self.api;
        let name = self.physical(channel)?;
        let task = Task::new(api)?;

        // SAFETY: all pointers are valid for the duration of the calls
        unsafe {
            api.check((api.create_ao_voltage_chan)(
                task.handle,
                name.as_ptr(),
                c"".as_ptr(),
                range.min,
                range.max,
                VAL_VOLTS,
                ptr::null(),
            ))?;
            api.check((api.write_analog_scalar_f64)(
                task.handle,
                1,
                TIMEOUT_S,
                volts,
                ptr::null_mut(),
            ))?;
        }
        Ok(())
    }
}

impl DigitalOutput for &NiDaqmx {
    fn write_line(&mut self, line: DigitalLine, high: bool) -> Result<(), DaqError> {
        self.write_line_sequence(line, &[high])
    }

    fn write_line_sequence(&mut self, line: DigitalLine, levels: &[bool]) -> Result<(), DaqError> {
        let api = &self.api;
        let name = self.physical(line)?;
        let task = Task::new(api)?;

        // SAFETY: all pointers are valid for the duration of the calls
        unsafe {
            api.check((api.create_do_chan)(
                task.handle,
                name.as_ptr(),
                c"".as_ptr(),
                VAL_CHAN_FOR_ALL_LINES,
            ))?;
        }

        for &level in levels {
            let data = [u8::from(level)];
            let mut written: i32 = 0;
            // SAFETY: `data` holds one sample for the single line
            unsafe {
                api.check((api.write_digital_lines)(
                    task.handle,
                    1,
                    1,
                    TIMEOUT_S,
                    VAL_GROUP_BY_CHANNEL,
                    data.as_ptr(),
                    &mut written,
                    ptr::null_mut(),
                ))?;
            }
            if written != 1 {
                return Err(DaqError::ShortRead);
            }
        }
        Ok(())
    }
}
