pub const DEFAULT_WINDOW_WIDTH: f32 = 1440.0;
pub const DEFAULT_WINDOW_HEIGHT: f32 = 900.0;

/// Number of model-id characters prefixed to generated material names.
pub const MATERIAL_NAME_PREFIX_LEN: usize = 4;

/// Maximum bone capacity of the shader configuration built at startup.
pub const DEFAULT_MAX_BONES: u32 = 0;

/// Default placement density for the model brush.
pub const DEFAULT_BRUSH_DENSITY: f32 = 0.5;

/// Edge length of palette thumbnails in pixels.
pub const THUMBNAIL_SIZE: u32 = 80;

/// How many thumbnails may be decoded per frame.
pub const MAX_THUMBNAILS_PER_FRAME: usize = 2;
