//! Image blob storage adapters.

mod filesystem;
mod memory;

pub use filesystem::FilesystemImageStore;
pub use memory::InMemoryImageStore;

/// Join a public media prefix and a relative blob path with one slash.
fn media_url(prefix: &str, path: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::media_url;

    #[rstest]
    #[case("/media/", "/media/uploads/recipe/a.png")]
    #[case("/media", "/media/uploads/recipe/a.png")]
    #[case("https://cdn.example.com/m/", "https://cdn.example.com/m/uploads/recipe/a.png")]
    fn prefixes_are_joined_with_one_slash(#[case] prefix: &str, #[case] expected: &str) {
        assert_eq!(media_url(prefix, "uploads/recipe/a.png"), expected);
    }
}
