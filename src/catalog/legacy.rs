//! Static catalog data: UI categories, the built-in fallback product list
//! and the mapping between UI category slugs and stored type slugs.

use crate::types::{Category, LegacyProduct};

pub const CATEGORIES: &[Category] = &[
    Category { id: "rebar", name: "Арматура" },
    Category { id: "profile-pipe", name: "Труба профильная" },
    Category { id: "sheet", name: "Листовой прокат" },
    Category { id: "angle", name: "Уголок" },
    Category { id: "channel", name: "Швеллер" },
    Category { id: "beam", name: "Балка двутавровая" },
    Category { id: "round-pipe", name: "Труба круглая" },
    Category { id: "profnastil", name: "Профнастил" },
];

pub const LEGACY_PRODUCTS: &[LegacyProduct] = &[
    LegacyProduct { id: "arm-a500c", title: "Арматура А500С", image: "/img/iron1.jpg", category_id: "rebar", description: "" },
    LegacyProduct { id: "pipe-40x20", title: "Труба профильная 40x20", image: "/img/iron2.jpg", category_id: "profile-pipe", description: "" },
    LegacyProduct { id: "sheet-3mm", title: "Лист стальной 3мм", image: "/img/iron3.webp", category_id: "sheet", description: "" },
    LegacyProduct { id: "angle-50x50", title: "Уголок стальной 50x50", image: "/img/iron4.jpg", category_id: "angle", description: "" },
    LegacyProduct { id: "profnastil-c8", title: "Профнастил С8", image: "/img/iron5.webp", category_id: "profnastil", description: "" },
    LegacyProduct { id: "channel-12p", title: "Швеллер 12П", image: "/img/iron6.webp", category_id: "channel", description: "" },
    LegacyProduct { id: "beam-i", title: "Балка двутавровая", image: "/img/iron7.jpg", category_id: "beam", description: "" },
    LegacyProduct { id: "rebar-a3", title: "Арматура А3", image: "/img/iron8.jpg", category_id: "rebar", description: "" },
    LegacyProduct { id: "round-50mm", title: "Труба круглая 50мм", image: "/img/iron9.jpg", category_id: "round-pipe", description: "" },
    LegacyProduct { id: "sheet-zn", title: "Лист оцинкованный", image: "/img/iron10.jpg", category_id: "sheet", description: "" },
    LegacyProduct { id: "angle-25x25", title: "Уголок 25x25", image: "/img/iron11.jpg", category_id: "angle", description: "" },
    LegacyProduct { id: "profnastil-c20", title: "Профнастил С20", image: "/img/iron12.jpg", category_id: "profnastil", description: "" },
    LegacyProduct { id: "channel-10p", title: "Швеллер 10П", image: "/img/iron13.jpg", category_id: "channel", description: "" },
    LegacyProduct { id: "beam-20b1", title: "Балка 20Б1", image: "/img/iron14.jpg", category_id: "beam", description: "" },
    LegacyProduct { id: "rebar-a800", title: "Арматура А800", image: "/img/iron4.jpg", category_id: "rebar", description: "" },
    LegacyProduct { id: "pipe-60x40", title: "Труба профильная 60x40", image: "/img/iron6.webp", category_id: "profile-pipe", description: "" },
];

/// Stored type slugs and their human-readable labels, as managers enter them
/// in the admin panel.
const TYPE_SLUG_OPTIONS: &[(&str, &str)] = &[
    ("armatura", "Арматура"),
    ("truba-profilnaya", "Труба профильная"),
    ("sortovoy-prokat", "Сортовой прокат"),
    ("truba-kruglaya", "Труба круглая"),
    ("listovoy-prokat", "Листовой прокат"),
    ("profnastil", "Профнастил"),
    ("kovanye-izdeliya", "Кованые изделия"),
    ("shtaketnik-metallicheskiy", "Штакетник металлический"),
    ("setka-metallicheskaia", "Сетка металлическая"),
    ("stroymaterialy", "Стройматериалы"),
    ("zabory", "Заборы"),
    ("krepezh", "Крепеж"),
    ("fitingi", "Фитинги"),
    ("vintovye-svai", "Винтовые сваи"),
    ("zaglushki-dlya-profilnyh-trub", "Заглушки для профильных труб"),
];

/// Catalog page slugs and their page titles.
const CATALOG_TITLES: &[(&str, &str)] = &[
    ("armatura", "Арматура"),
    ("truba-profilnaya", "Труба профильная"),
    ("sortovoy-prokat", "Сортовой прокат"),
    ("truba-kruglaya", "Труба круглая"),
    ("listovoy-prokat", "Листовой прокат"),
    ("profnastil", "Профнастил"),
    ("kovanye-izdeliya", "Кованые изделия"),
    ("shtaketnik-metallicheskiy", "Штакетник металлический"),
    ("setka-metallicheskaia", "Сетка металлическая"),
    ("stroymaterialy", "Стройматериалы"),
    ("zabory", "Заборы"),
    ("krepezh", "Крепеж"),
    ("petli", "Петли"),
    ("fitingi", "Фитинги"),
    ("vintovye-svai", "Винтовые сваи"),
    ("zaglushki-dlya-profilnyh-trub", "Заглушки для профильных труб"),
];

/// Maps a UI category id (as used by the front-end filters) to the type slug
/// stored in product rows. Unknown values pass through untouched so callers
/// may already hand us a type slug.
pub fn category_to_type_slug(category: &str) -> &str {
    match category {
        "rebar" => "armatura",
        "profile-pipe" => "truba-profilnaya",
        "round-pipe" => "truba-kruglaya",
        "sheet" => "listovoy-prokat",
        "profnastil" => "profnastil",
        "beam" => "sortovoy-prokat",
        other => other,
    }
}

/// Page title for a catalog slug, or None for slugs we never link to.
pub fn catalog_title(slug: &str) -> Option<&'static str> {
    CATALOG_TITLES
        .iter()
        .find(|(s, _)| *s == slug)
        .map(|(_, title)| *title)
}

/// Normalizes a stored product type to its slug form: passes slugs through,
/// resolves human labels, lowercases anything unknown.
pub fn normalize_type_slug(kind: &str) -> String {
    let kind = kind.trim();
    if TYPE_SLUG_OPTIONS.iter().any(|(slug, _)| *slug == kind) {
        return kind.to_string();
    }
    let normalized = super::normalize_label(kind);
    if let Some((slug, _)) = TYPE_SLUG_OPTIONS
        .iter()
        .find(|(_, label)| super::normalize_label(label) == normalized)
    {
        return (*slug).to_string();
    }
    kind.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_mapping() {
        assert_eq!(category_to_type_slug("rebar"), "armatura");
        assert_eq!(category_to_type_slug("armatura"), "armatura");
        assert_eq!(category_to_type_slug("profnastil"), "profnastil");
    }

    #[test]
    fn test_normalize_type_slug() {
        assert_eq!(normalize_type_slug("armatura"), "armatura");
        assert_eq!(normalize_type_slug("Арматура"), "armatura");
        assert_eq!(normalize_type_slug("  Труба профильная "), "truba-profilnaya");
        assert_eq!(normalize_type_slug("Something Else"), "something else");
    }

    #[test]
    fn test_catalog_title_lookup() {
        assert_eq!(catalog_title("armatura"), Some("Арматура"));
        assert_eq!(catalog_title("nope"), None);
    }
}
