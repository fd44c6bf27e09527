//! Static Image Catalog
//!
//! Compile-time catalog of per-brand candidate image paths. Paths are
//! relative to the web root; the resolver never checks the filesystem, it
//! only hands out plausible paths for the view layer to render.

/// Fallback when a brand has no candidates or no candidate scores high enough
pub const DEFAULT_IMAGE: &str = "images/placeholder.png";

/// Candidate image paths per normalized brand key
pub const BRAND_IMAGES: &[(&str, &[&str])] = &[
    (
        "fruit monster",
        &[
            "images/fruit_monster/mango_peach_guava.jpg",
            "images/fruit_monster/blueberry_raspberry_lemon.jpg",
            "images/fruit_monster/strawberry_kiwi_pomegranate.jpg",
            "images/fruit_monster/mixed_berry.jpg",
        ],
    ),
    (
        "juice head",
        &[
            "images/juice_head/peach_pear.jpg",
            "images/juice_head/pineapple_grapefruit.jpg",
            "images/juice_head/watermelon_lime.jpg",
            "images/juice_head/blueberry_lemon.jpg",
            "images/juice_head/guava_peach.jpg",
        ],
    ),
    (
        "naked 100",
        &[
            "images/naked_100/lava_flow.jpg",
            "images/naked_100/hawaiian_pog.jpg",
            "images/naked_100/green_blast.jpg",
            "images/naked_100/very_cool.jpg",
            "images/naked_100/amazing_mango.jpg",
        ],
    ),
    (
        "twist",
        &[
            "images/twist/pink_punch_lemonade.jpg",
            "images/twist/pucker_punch.jpg",
            "images/twist/watermelon_madness.jpg",
            "images/twist/iced_pink_punch.jpg",
        ],
    ),
    (
        "coastal clouds",
        &[
            "images/coastal_clouds/blue_raz_ice.jpg",
            "images/coastal_clouds/apple_peach_strawberry.jpg",
            "images/coastal_clouds/mango_berries.jpg",
            "images/coastal_clouds/iced_passion_fruit.jpg",
        ],
    ),
    (
        "blvk",
        &[
            "images/blvk/unicorn_strawberry.jpg",
            "images/blvk/ella_mint.jpg",
            "images/blvk/frznberry.jpg",
        ],
    ),
];

/// Aliases for brand names as they appear in imports and legacy data
const BRAND_ALIASES: &[(&str, &str)] = &[
    ("naked100", "naked 100"),
    ("naked", "naked 100"),
    ("juicehead", "juice head"),
    ("fruitmonster", "fruit monster"),
    ("monster", "fruit monster"),
    ("twist e liquids", "twist"),
    ("twist e liquid", "twist"),
    ("coastalclouds", "coastal clouds"),
    ("blvk unicorn", "blvk"),
];

/// Resolve a raw brand string to a catalog key, if the brand is known
pub fn resolve_brand_key(raw: &str) -> Option<&'static str> {
    let normalized = super::similarity::normalize(raw);
    if normalized.is_empty() {
        return None;
    }

    for (key, _) in BRAND_IMAGES {
        if *key == normalized {
            return Some(key);
        }
    }
    for (alias, key) in BRAND_ALIASES {
        if *alias == normalized {
            return Some(key);
        }
    }
    None
}

/// Candidate paths for a catalog key; empty for unknown brands
pub fn candidates_for(key: &str) -> &'static [&'static str] {
    BRAND_IMAGES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, paths)| *paths)
        .unwrap_or(&[])
}
