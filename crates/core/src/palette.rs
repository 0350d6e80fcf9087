//! Product group colors used by the web client.

/// Hex colors (without `#`) indexed by product group id.
pub const GROUP_COLORS: [&str; 29] = [
    "b4bec6", "524dcf", "864f9e", "ba2e38", "e57542", "ff5699", "75b35a", "26b0c7", "c1c12f",
    "20a881", "8faecd", "416362", "f4b72f", "a19080", "931f54", "4cc9f5", "ff2966", "c4b8ce",
    "9e5e59", "4f3c6d", "5372c5", "a85271", "f57f03", "957d41", "4f99aa", "fd9c69", "de2b17",
    "797d88", "b4cc8b",
];

/// Color for a product group. Negative or unknown groups fall back to the
/// first entry.
pub fn color(group_id: i64) -> &'static str {
    usize::try_from(group_id)
        .ok()
        .and_then(|index| GROUP_COLORS.get(index))
        .copied()
        .unwrap_or(GROUP_COLORS[0])
}
