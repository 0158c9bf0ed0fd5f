const MAX_PIXEL_RATIO: f64 = 2.0;

/// Window size in logical pixels plus the device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub device_pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
        }
    }

    pub fn from_physical(size: winit::dpi::PhysicalSize<u32>, scale_factor: f64) -> Self {
        let logical = size.to_logical::<f64>(scale_factor);
        Self::new(logical.width, logical.height, scale_factor)
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio.min(MAX_PIXEL_RATIO)
    }

    pub fn aspect(&self) -> f32 {
        if self.height <= 0.0 {
            return 1.0;
        }
        (self.width / self.height) as f32
    }

    /// Resolution points are sized against, using the capped ratio.
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        self.scaled_size(self.pixel_ratio())
    }

    /// Full physical size of the window. The surface must match it.
    pub fn surface_size(&self) -> (u32, u32) {
        self.scaled_size(self.device_pixel_ratio)
    }

    fn scaled_size(&self, ratio: f64) -> (u32, u32) {
        let width = (self.width * ratio).round().max(1.0) as u32;
        let height = (self.height * ratio).round().max(1.0) as u32;
        (width, height)
    }
}
