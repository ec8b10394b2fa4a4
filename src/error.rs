//! Error types for driftfield.
//!
//! A missing render target is fatal to the backdrop and must surface loudly
//! through `Backdrop::run()` rather than leaving a silently blank window.

use std::fmt;

/// Errors that can occur while bringing up the GPU.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::NoAdapter => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur when running a backdrop.
#[derive(Debug)]
pub enum BackdropError {
    /// Failed to create the event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create the window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
}

impl fmt::Display for BackdropError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackdropError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            BackdropError::Window(e) => write!(f, "Failed to create window: {}", e),
            BackdropError::Gpu(e) => write!(f, "GPU error: {}", e),
        }
    }
}

impl std::error::Error for BackdropError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BackdropError::EventLoop(e) => Some(e),
            BackdropError::Window(e) => Some(e),
            BackdropError::Gpu(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for BackdropError {
    fn from(e: winit::error::EventLoopError) -> Self {
        BackdropError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for BackdropError {
    fn from(e: winit::error::OsError) -> Self {
        BackdropError::Window(e)
    }
}

impl From<GpuError> for BackdropError {
    fn from(e: GpuError) -> Self {
        BackdropError::Gpu(e)
    }
}
