use std::{ffi::c_void, rc::Rc};

use flowcam_image::{FrameDescriptor, FrameDescriptorMut, RawImage};

use crate::{
    engine::{
        check_geometry, color_geometry, flow_geometry, gray_geometry, FlowColorEncoder,
        FlowEngine,
    },
    error::FlowError,
};

mod ffi {
    use std::ffi::c_void;

    use flowcam_image::RawImage;

    extern "C" {
        pub fn ff_filter_create(
            height: i32,
            width: i32,
            levels: i32,
            out: *mut *mut c_void,
        ) -> i32;
        pub fn ff_filter_destroy(filter: *mut c_void);
        pub fn ff_filter_set_max_flow(filter: *mut c_void, max_flow: f32) -> i32;
        pub fn ff_filter_set_gamma(filter: *mut c_void, gamma: *const f32, len: usize) -> i32;
        pub fn ff_filter_set_smooth_iterations(
            filter: *mut c_void,
            iterations: *const i32,
            len: usize,
        ) -> i32;
        pub fn ff_filter_load_image(filter: *mut c_void, image: RawImage) -> i32;
        pub fn ff_filter_compute(filter: *mut c_void) -> i32;
        pub fn ff_filter_download_flow(filter: *mut c_void, flow: RawImage) -> i32;
        pub fn ff_filter_elapsed_time(filter: *mut c_void) -> f32;

        pub fn ff_color_create(filter: *mut c_void, max_flow: f32, out: *mut *mut c_void) -> i32;
        pub fn ff_color_destroy(color: *mut c_void);
        pub fn ff_color_compute(color: *mut c_void) -> i32;
        pub fn ff_color_download(color: *mut c_void, image: RawImage) -> i32;
    }
}

fn check(op: &'static str, code: i32) -> Result<(), FlowError> {
    if code != 0 {
        log::error!("flowfilter call {op} failed with status {code}");
        return Err(FlowError::Backend { op, code });
    }
    Ok(())
}

fn to_c_int(value: usize, what: &'static str) -> Result<i32, FlowError> {
    i32::try_from(value).map_err(|_| FlowError::Config(format!("{what} {value} is too large")))
}

/// Owns the native filter and destroys it once the last user is gone.
struct FilterHandle(*mut c_void);

impl Drop for FilterHandle {
    fn drop(&mut self) {
        // SAFETY: the pointer came from ff_filter_create and is released once.
        unsafe { ffi::ff_filter_destroy(self.0) }
    }
}

/// The pyramidal flow filter of the flowfilter library running on the GPU.
///
/// The handle is not `Send`: the filter and its CUDA context stay on the
/// thread that created them.
pub struct GpuFlowFilter {
    handle: Rc<FilterHandle>,
    height: usize,
    width: usize,
}

impl GpuFlowFilter {
    /// Allocate a filter for frames of `height` x `width`.
    ///
    /// The signature lets the function be passed directly as an engine factory.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Backend`] if the device allocation fails.
    pub fn new(height: usize, width: usize, levels: usize) -> Result<Self, FlowError> {
        let (h, w, l) = (
            to_c_int(height, "height")?,
            to_c_int(width, "width")?,
            to_c_int(levels, "levels")?,
        );

        let mut raw = std::ptr::null_mut();
        // SAFETY: `raw` is a valid out pointer for the duration of the call.
        check("create", unsafe { ffi::ff_filter_create(h, w, l, &mut raw) })?;
        if raw.is_null() {
            return Err(FlowError::Backend {
                op: "create",
                code: -1,
            });
        }

        log::debug!("Created GPU flow filter {height}x{width} with {levels} levels");

        Ok(Self {
            handle: Rc::new(FilterHandle(raw)),
            height,
            width,
        })
    }

    fn raw(&self) -> *mut c_void {
        self.handle.0
    }
}

impl FlowEngine for GpuFlowFilter {
    type Encoder = GpuFlowToColor;

    fn set_max_flow(&mut self, max_flow: f32) -> Result<(), FlowError> {
        // SAFETY: the handle is alive for as long as `self`.
        check("set_max_flow", unsafe {
            ffi::ff_filter_set_max_flow(self.raw(), max_flow)
        })
    }

    fn set_gamma(&mut self, gamma: &[f32]) -> Result<(), FlowError> {
        // SAFETY: the slice outlives the call, the shim copies it.
        check("set_gamma", unsafe {
            ffi::ff_filter_set_gamma(self.raw(), gamma.as_ptr(), gamma.len())
        })
    }

    fn set_smooth_iterations(&mut self, iterations: &[u32]) -> Result<(), FlowError> {
        let iterations = iterations
            .iter()
            .map(|&n| to_c_int(n as usize, "smooth iterations"))
            .collect::<Result<Vec<_>, _>>()?;
        // SAFETY: the vector outlives the call, the shim copies it.
        check("set_smooth_iterations", unsafe {
            ffi::ff_filter_set_smooth_iterations(self.raw(), iterations.as_ptr(), iterations.len())
        })
    }

    fn load_image(&mut self, image: &FrameDescriptor<'_>) -> Result<(), FlowError> {
        check_geometry(gray_geometry(self.height, self.width), image.geometry())?;
        let raw: RawImage = image.as_raw();
        // SAFETY: the shim only reads from the buffer, which is borrowed for the call.
        check("load_image", unsafe {
            ffi::ff_filter_load_image(self.raw(), raw)
        })
    }

    fn compute(&mut self) -> Result<(), FlowError> {
        // SAFETY: the handle is alive for as long as `self`.
        check("compute", unsafe { ffi::ff_filter_compute(self.raw()) })
    }

    fn download_flow(&mut self, flow: &mut FrameDescriptorMut<'_>) -> Result<(), FlowError> {
        check_geometry(flow_geometry(self.height, self.width), flow.geometry())?;
        // SAFETY: the buffer is exclusively borrowed and sized for the flow field.
        check("download_flow", unsafe {
            ffi::ff_filter_download_flow(self.raw(), flow.as_raw())
        })
    }

    fn color_encoder(&self, max_flow: f32) -> Result<GpuFlowToColor, FlowError> {
        let mut raw = std::ptr::null_mut();
        // SAFETY: the filter is alive and `raw` is a valid out pointer.
        check("color_create", unsafe {
            ffi::ff_color_create(self.raw(), max_flow, &mut raw)
        })?;
        if raw.is_null() {
            return Err(FlowError::Backend {
                op: "color_create",
                code: -1,
            });
        }

        Ok(GpuFlowToColor {
            raw,
            height: self.height,
            width: self.width,
            _filter: Rc::clone(&self.handle),
        })
    }

    fn elapsed_time(&self) -> Option<f32> {
        // SAFETY: the handle is alive for as long as `self`.
        let ms = unsafe { ffi::ff_filter_elapsed_time(self.raw()) };
        (ms >= 0.0).then_some(ms)
    }
}

/// RGBA color encoding of a [`GpuFlowFilter`] flow field.
///
/// Keeps the filter alive since the encoder reads its device flow buffer.
pub struct GpuFlowToColor {
    raw: *mut c_void,
    height: usize,
    width: usize,
    _filter: Rc<FilterHandle>,
}

impl FlowColorEncoder for GpuFlowToColor {
    fn compute(&mut self) -> Result<(), FlowError> {
        // SAFETY: the encoder and the filter it reads are both alive.
        check("color_compute", unsafe { ffi::ff_color_compute(self.raw) })
    }

    fn download_color(&mut self, color: &mut FrameDescriptorMut<'_>) -> Result<(), FlowError> {
        check_geometry(color_geometry(self.height, self.width), color.geometry())?;
        // SAFETY: the buffer is exclusively borrowed and sized for the encoding.
        check("color_download", unsafe {
            ffi::ff_color_download(self.raw, color.as_raw())
        })
    }
}

impl Drop for GpuFlowToColor {
    fn drop(&mut self) {
        // SAFETY: the pointer came from ff_color_create and is released once,
        // before the filter handle it references.
        unsafe { ffi::ff_color_destroy(self.raw) }
    }
}
