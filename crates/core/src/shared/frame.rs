use ndarray::{ArrayView3, ArrayViewMut3};

/// A decoded video frame: contiguous RGB bytes in row-major order,
/// stamped with its presentation time in seconds.
///
/// Pixel format conversion happens in the decoder; everything downstream
/// works on packed RGB24.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    timestamp: f64,
}

pub const RGB_CHANNELS: usize = 3;

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, timestamp: f64) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * RGB_CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            timestamp,
        }
    }

    /// A frame filled with a single color.
    pub fn solid(width: u32, height: u32, rgb: [u8; 3], timestamp: f64) -> Self {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * RGB_CHANNELS)
            .collect();
        Self::new(data, width, height, timestamp)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let arr = self.as_ndarray();
        let (row, col) = (y as usize, x as usize);
        [arr[[row, col, 0]], arr[[row, col, 1]], arr[[row, col, 2]]]
    }

    /// Fills the rectangle, clipped to the frame bounds.
    pub fn fill_rect(&mut self, x: i64, y: i64, width: u32, height: u32, rgb: [u8; 3]) {
        let x0 = x.clamp(0, self.width as i64) as usize;
        let y0 = y.clamp(0, self.height as i64) as usize;
        let x1 = (x + width as i64).clamp(0, self.width as i64) as usize;
        let y1 = (y + height as i64).clamp(0, self.height as i64) as usize;

        let mut arr = self.as_ndarray_mut();
        for row in y0..y1 {
            for col in x0..x1 {
                for (c, value) in rgb.iter().enumerate() {
                    arr[[row, col, c]] = *value;
                }
            }
        }
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        let shape = self.shape();
        ArrayViewMut3::from_shape(shape, &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (self.height as usize, self.width as usize, RGB_CHANNELS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 1.5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.timestamp(), 1.5);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * 3")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2, 0.0);
    }

    #[test]
    fn test_solid_fills_every_pixel() {
        let frame = Frame::solid(3, 2, [10, 20, 30], 0.0);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(frame.pixel(x, y), [10, 20, 30]);
            }
        }
    }

    #[test]
    fn test_fill_rect_inside_bounds() {
        let mut frame = Frame::solid(4, 4, [0, 0, 0], 0.0);
        frame.fill_rect(1, 1, 2, 2, [255, 255, 255]);
        assert_eq!(frame.pixel(0, 0), [0, 0, 0]);
        assert_eq!(frame.pixel(1, 1), [255, 255, 255]);
        assert_eq!(frame.pixel(2, 2), [255, 255, 255]);
        assert_eq!(frame.pixel(3, 3), [0, 0, 0]);
    }

    #[test]
    fn test_fill_rect_is_clipped() {
        let mut frame = Frame::solid(4, 4, [0, 0, 0], 0.0);
        frame.fill_rect(-2, 3, 10, 10, [1, 2, 3]);
        assert_eq!(frame.pixel(0, 3), [1, 2, 3]);
        assert_eq!(frame.pixel(3, 3), [1, 2, 3]);
        assert_eq!(frame.pixel(0, 2), [0, 0, 0]);
    }

    #[test]
    fn test_as_ndarray_shape() {
        let frame = Frame::new(vec![0u8; 24], 4, 2, 0.0);
        assert_eq!(frame.as_ndarray().shape(), &[2, 4, 3]); // (height, width, channels)
    }
}
