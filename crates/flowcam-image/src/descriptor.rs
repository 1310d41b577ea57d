use std::{ffi::c_void, marker::PhantomData, ptr::NonNull};

use crate::{
    error::ImageError,
    image::{Image, ImageDtype},
};

/// The geometry of a host buffer as seen by an external consumer.
///
/// All fields mirror the owning image at the time the descriptor was created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameGeometry {
    /// Number of rows.
    pub height: usize,
    /// Number of columns.
    pub width: usize,
    /// Number of interleaved channels per pixel.
    pub depth: usize,
    /// Distance in bytes between the start of two consecutive rows.
    pub pitch: usize,
    /// Size in bytes of a single channel element.
    pub item_size: usize,
}

impl FrameGeometry {
    /// Compute the geometry of a contiguous image.
    pub fn of<T, const C: usize>(image: &Image<T, C>) -> Self
    where
        T: ImageDtype,
    {
        let item_size = std::mem::size_of::<T>();
        Self {
            height: image.rows(),
            width: image.cols(),
            depth: C,
            pitch: image.cols() * C * item_size,
            item_size,
        }
    }

    /// Number of bytes spanned by the buffer.
    pub fn num_bytes(&self) -> usize {
        self.pitch * self.height
    }

    /// Number of bytes covered by the pixels of one row, excluding padding.
    pub fn row_bytes(&self) -> usize {
        self.width * self.depth * self.item_size
    }
}

/// C layout of a frame descriptor, as consumed by the flow filter library.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct RawImage {
    /// Pointer to the first byte of the first row.
    pub data: *mut c_void,
    /// Number of rows.
    pub height: usize,
    /// Number of columns.
    pub width: usize,
    /// Number of interleaved channels per pixel.
    pub depth: usize,
    /// Row pitch in bytes.
    pub pitch: usize,
    /// Size in bytes of a single channel element.
    pub item_size: usize,
}

fn checked_geometry<T, const C: usize>(image: &Image<T, C>) -> Result<FrameGeometry, ImageError>
where
    T: ImageDtype,
{
    if image.size().is_empty() {
        return Err(ImageError::EmptyImage(image.width(), image.height()));
    }
    Ok(FrameGeometry::of(image))
}

/// A read-only, non-owning descriptor of a host image.
///
/// The descriptor borrows the image for `'a`, so the buffer can neither be
/// dropped nor reallocated while an external consumer holds the pointer.
/// Creating it performs no copy and no allocation.
///
/// # Examples
///
/// ```
/// use flowcam_image::{FrameDescriptor, Image, ImageSize};
///
/// let gray = Image::<u8, 1>::from_size_val(ImageSize { width: 4, height: 2 }, 0).unwrap();
/// let desc = FrameDescriptor::from_image(&gray).unwrap();
///
/// assert_eq!(desc.height(), 2);
/// assert_eq!(desc.width(), 4);
/// assert_eq!(desc.pitch(), 4);
/// assert_eq!(desc.item_size(), 1);
/// ```
#[derive(Debug)]
pub struct FrameDescriptor<'a> {
    geometry: FrameGeometry,
    data: NonNull<u8>,
    _marker: PhantomData<&'a [u8]>,
}

impl<'a> FrameDescriptor<'a> {
    /// Wrap an image without copying it.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::EmptyImage`] if the image has no pixels.
    pub fn from_image<T, const C: usize>(image: &'a Image<T, C>) -> Result<Self, ImageError>
    where
        T: ImageDtype,
    {
        let geometry = checked_geometry(image)?;
        let data = NonNull::new(image.as_slice().as_ptr() as *mut u8)
            .ok_or(ImageError::EmptyImage(image.width(), image.height()))?;
        Ok(Self {
            geometry,
            data,
            _marker: PhantomData,
        })
    }

    /// The geometry of the wrapped buffer.
    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.geometry.height
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.geometry.width
    }

    /// Number of channels.
    pub fn depth(&self) -> usize {
        self.geometry.depth
    }

    /// Row pitch in bytes.
    pub fn pitch(&self) -> usize {
        self.geometry.pitch
    }

    /// Size in bytes of one channel element.
    pub fn item_size(&self) -> usize {
        self.geometry.item_size
    }

    /// Raw pointer to the wrapped memory.
    pub fn as_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    /// The wrapped memory as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: the descriptor borrows an initialized buffer of exactly
        // `pitch * height` bytes for `'a`.
        unsafe { std::slice::from_raw_parts(self.data.as_ptr(), self.geometry.num_bytes()) }
    }

    /// The C layout of the descriptor.
    ///
    /// The returned pointer must only be read from and only while `self` is alive.
    pub fn as_raw(&self) -> RawImage {
        raw_image(self.geometry, self.data)
    }
}

/// A writable, non-owning descriptor of a host image.
///
/// Used as the destination of downloads from an external engine. The image is
/// mutably borrowed for `'a`.
#[derive(Debug)]
pub struct FrameDescriptorMut<'a> {
    geometry: FrameGeometry,
    data: NonNull<u8>,
    _marker: PhantomData<&'a mut [u8]>,
}

impl<'a> FrameDescriptorMut<'a> {
    /// Wrap an image mutably without copying it.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::EmptyImage`] if the image has no pixels.
    pub fn from_image<T, const C: usize>(image: &'a mut Image<T, C>) -> Result<Self, ImageError>
    where
        T: ImageDtype,
    {
        let geometry = checked_geometry(image)?;
        let (width, height) = (image.width(), image.height());
        let data = NonNull::new(image.as_slice_mut().as_mut_ptr() as *mut u8)
            .ok_or(ImageError::EmptyImage(width, height))?;
        Ok(Self {
            geometry,
            data,
            _marker: PhantomData,
        })
    }

    /// The geometry of the wrapped buffer.
    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.geometry.height
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.geometry.width
    }

    /// Number of channels.
    pub fn depth(&self) -> usize {
        self.geometry.depth
    }

    /// Row pitch in bytes.
    pub fn pitch(&self) -> usize {
        self.geometry.pitch
    }

    /// Size in bytes of one channel element.
    pub fn item_size(&self) -> usize {
        self.geometry.item_size
    }

    /// Raw pointer to the wrapped memory.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.data.as_ptr()
    }

    /// The wrapped memory as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: see `FrameDescriptor::as_bytes`.
        unsafe { std::slice::from_raw_parts(self.data.as_ptr(), self.geometry.num_bytes()) }
    }

    /// The wrapped memory as mutable bytes.
    ///
    /// Any bit pattern written here is a valid pixel value (see [`ImageDtype`]).
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: the descriptor holds the unique borrow of the buffer for `'a`.
        unsafe { std::slice::from_raw_parts_mut(self.data.as_ptr(), self.geometry.num_bytes()) }
    }

    /// The C layout of the descriptor.
    ///
    /// The returned pointer is valid for writes only while `self` is alive.
    pub fn as_raw(&mut self) -> RawImage {
        raw_image(self.geometry, self.data)
    }
}

fn raw_image(geometry: FrameGeometry, data: NonNull<u8>) -> RawImage {
    RawImage {
        data: data.as_ptr() as *mut c_void,
        height: geometry.height,
        width: geometry.width,
        depth: geometry.depth,
        pitch: geometry.pitch,
        item_size: geometry.item_size,
    }
}
