/// Largest registry the codec can address: item IDs are stored as one byte.
pub const MAX_ITEMS: usize = 256;

/// Preset top-K sizes offered alongside a full ranking.
pub const TOP_K_PRESETS: [usize; 5] = [10, 20, 30, 40, 50];

/// Highest rank a share token can carry. Larger ranks are clamped.
pub const MAX_ENCODED_RANK: u32 = 255;

/// File extensions treated as image assets when loading item entries.
pub const ASSET_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "gif"];
