use thiserror::Error;

/// Asset keys are forward-slash paths relative to the asset root, including
/// the file extension (`graphics/characters/player.png`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpriteKeyError {
    #[error("sprite key must not be empty")]
    Empty,
    #[error("sprite key must not start with '/'")]
    LeadingSlash,
    #[error("sprite key must not contain '\\\\'")]
    Backslash,
    #[error("sprite key must not contain a '..' segment")]
    ParentTraversal,
    #[error("sprite key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

pub fn validate_sprite_key(key: &str) -> Result<(), SpriteKeyError> {
    if key.is_empty() {
        return Err(SpriteKeyError::Empty);
    }
    if key.starts_with('/') {
        return Err(SpriteKeyError::LeadingSlash);
    }
    if key.contains('\\') {
        return Err(SpriteKeyError::Backslash);
    }
    if key.split('/').any(|segment| segment == "..") {
        return Err(SpriteKeyError::ParentTraversal);
    }
    for ch in key.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '/' | '-' | '.' | ' ') {
            continue;
        }
        return Err(SpriteKeyError::InvalidCharacter { character: ch });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_keys() {
        for key in [
            "graphics/characters/player.png",
            "graphics/tilesets/coast.png",
            "pets/cat_joy.png",
            "graphics/tilesets/water/0.png",
            "Water Tiles/a-b_c.png",
        ] {
            assert!(validate_sprite_key(key).is_ok(), "key={key}");
        }
    }

    #[test]
    fn rejects_invalid_keys() {
        for key in ["", "/a.png", "..", "a/../b.png", r"a\b.png", "a?.png"] {
            assert!(validate_sprite_key(key).is_err(), "key={key}");
        }
    }

    #[test]
    fn dots_inside_names_are_not_traversal() {
        assert!(validate_sprite_key("sheet..v2.png").is_ok());
        assert_eq!(
            validate_sprite_key("maps/../x.png"),
            Err(SpriteKeyError::ParentTraversal)
        );
    }
}
