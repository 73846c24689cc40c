//! Sub-category membership rules.
//!
//! Product rows carry free-text `subtype`/`name`/`size` fields filled in by
//! managers, so the UI sub-filters are resolved heuristically: an exact match
//! on a canonical subtype label first, then an ASCII grade code, then
//! transliteration keyword stems. A (category, sub) pair nobody registered a
//! rule for filters nothing out.

use std::cmp::Ordering;

use crate::types::ProductRow;

/// Rule set for the database-backed catalog, keyed by UI category and
/// sub-category slugs. `code` is only populated for rebar grades, the one
/// category whose sub-filters are alphanumeric codes rather than words.
struct SubRule {
    category: &'static str,
    sub: &'static str,
    label: &'static str,
    code: Option<&'static str>,
    keywords: &'static [&'static str],
}

const SUB_RULES: &[SubRule] = &[
    SubRule {
        category: "profile-pipe",
        sub: "otsinkovannaya",
        label: "Труба оцинкованная",
        code: None,
        keywords: &["ocink", "otsink"],
    },
    SubRule {
        category: "profile-pipe",
        sub: "kvadratnaya",
        label: "Труба квадратная",
        code: None,
        keywords: &["kvadrat"],
    },
    SubRule {
        category: "profile-pipe",
        sub: "pryamougolnaya",
        label: "Труба прямоугольная",
        code: None,
        keywords: &["pryamoug"],
    },
    SubRule {
        category: "round-pipe",
        sub: "ocinkovannaya",
        label: "Труба оцинкованная",
        code: None,
        keywords: &["ocink", "otsink"],
    },
    SubRule {
        category: "round-pipe",
        sub: "besshovnaya",
        label: "Труба бесшовная",
        code: None,
        keywords: &["besshov"],
    },
    SubRule {
        category: "round-pipe",
        sub: "vgp",
        label: "Труба ВГП",
        code: None,
        keywords: &["vgp", "vodogaz"],
    },
    SubRule {
        category: "round-pipe",
        sub: "elektrosvarka",
        label: "Труба электросварная",
        code: None,
        keywords: &["elektrosvar"],
    },
    SubRule {
        category: "sheet",
        sub: "ocinkovanniy",
        label: "Лист оцинкованный",
        code: None,
        keywords: &["ocink", "otsink"],
    },
    SubRule {
        category: "sheet",
        sub: "st_goryachekatanyi",
        label: "Лист горячекатаный",
        code: None,
        keywords: &["goryachekatan"],
    },
    SubRule {
        category: "sheet",
        sub: "st_holodnokatanyi",
        label: "Лист холоднокатаный",
        code: None,
        keywords: &["holodnokatan"],
    },
    SubRule {
        category: "sheet",
        sub: "rifleniy_romb",
        label: "Лист рифленый ромб",
        code: None,
        keywords: &["riflen", "romb"],
    },
    SubRule {
        category: "sheet",
        sub: "riflenaya_chechevica",
        label: "Лист рифленый чечевица",
        code: None,
        keywords: &["chechev"],
    },
    SubRule {
        category: "sheet",
        sub: "prosechno-vytyazhnoy",
        label: "Лист просечно-вытяжной",
        code: None,
        keywords: &["prosech", "vytyazh", "pvl"],
    },
    SubRule {
        category: "profnastil",
        sub: "ocinkovannyy",
        label: "Профнастил оцинкованный",
        code: None,
        keywords: &["ocink", "otsink"],
    },
    SubRule {
        category: "profnastil",
        sub: "krashennyy",
        label: "Профнастил крашеный",
        code: None,
        keywords: &["krashen"],
    },
    SubRule {
        category: "profnastil",
        sub: "dlya-zabora",
        label: "Профнастил для забора",
        code: None,
        keywords: &["zabor"],
    },
    SubRule {
        category: "rebar",
        sub: "a500c",
        label: "Арматура А500С",
        code: Some("a500"),
        keywords: &["a500"],
    },
    SubRule {
        category: "rebar",
        sub: "a1",
        label: "Арматура А1",
        code: Some("a1"),
        keywords: &["gladk"],
    },
    SubRule {
        category: "rebar",
        sub: "a400",
        label: "Арматура А400",
        code: Some("a400"),
        keywords: &["a400"],
    },
    SubRule {
        category: "rebar",
        sub: "fixatory",
        label: "Фиксаторы арматуры",
        code: None,
        keywords: &["fiksator", "fixator"],
    },
    SubRule {
        category: "rebar",
        sub: "stekloplastikovaya",
        label: "Арматура стеклопластиковая",
        code: None,
        keywords: &["stekloplast", "frp"],
    },
];

/// Rule set for the built-in fallback catalog: Cyrillic stems matched
/// directly against the lowercased product title.
struct LegacyRule {
    category: &'static str,
    sub: &'static str,
    stems: &'static [&'static str],
}

const LEGACY_RULES: &[LegacyRule] = &[
    LegacyRule { category: "profile-pipe", sub: "otsinkovannaya", stems: &["оцинк"] },
    LegacyRule { category: "profile-pipe", sub: "kvadratnaya", stems: &["квадрат", "кв"] },
    LegacyRule { category: "profile-pipe", sub: "pryamougolnaya", stems: &["прямоуг"] },
    LegacyRule { category: "round-pipe", sub: "ocinkovannaya", stems: &["оцинк"] },
    LegacyRule { category: "round-pipe", sub: "besshovnaya", stems: &["бесшов"] },
    LegacyRule { category: "round-pipe", sub: "vgp", stems: &["водогаз", "вгп"] },
    LegacyRule { category: "round-pipe", sub: "elektrosvarka", stems: &["электросвар"] },
    LegacyRule { category: "sheet", sub: "ocinkovanniy", stems: &["оцинк"] },
    LegacyRule { category: "sheet", sub: "st_goryachekatanyi", stems: &["горячекатан"] },
    LegacyRule { category: "sheet", sub: "st_holodnokatanyi", stems: &["холоднокатан"] },
    LegacyRule { category: "sheet", sub: "rifleniy_romb", stems: &["рифлен", "ромб"] },
    LegacyRule { category: "sheet", sub: "riflenaya_chechevica", stems: &["чечев"] },
    LegacyRule { category: "sheet", sub: "prosechno-vytyazhnoy", stems: &["просеч", "вытяж"] },
    LegacyRule { category: "profnastil", sub: "ocinkovannyy", stems: &["оцинк"] },
    LegacyRule { category: "profnastil", sub: "krashennyy", stems: &["крашен"] },
    LegacyRule { category: "profnastil", sub: "dlya-zabora", stems: &["забор"] },
    LegacyRule { category: "rebar", sub: "a500c", stems: &["а500", "a500"] },
    LegacyRule { category: "rebar", sub: "a1", stems: &["a1", "а1", "гладкая"] },
    LegacyRule { category: "rebar", sub: "a400", stems: &["a400", "а400"] },
    LegacyRule { category: "rebar", sub: "fixatory", stems: &["фиксатор"] },
    LegacyRule { category: "rebar", sub: "stekloplastikovaya", stems: &["стеклопласт"] },
];

/// Lowercases, collapses whitespace runs and folds the two Latin/Cyrillic
/// look-alike pairs (a/а, c/с) that managers mix freely in grade codes.
/// Folds towards the Cyrillic side since labels are Cyrillic text.
pub fn normalize_label(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.to_lowercase().chars() {
        let c = match c {
            'a' => 'а',
            'c' => 'с',
            c => c,
        };
        if c.is_whitespace() {
            if !out.is_empty() && !out.ends_with(' ') {
                out.push(' ');
            }
        } else {
            out.push(c);
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Reduces text to a lowercase ASCII letters-and-digits blob: the look-alike
/// pairs fold to Latin, everything else non-ASCII is dropped. Grade codes and
/// transliterated stems are matched by substring against this blob.
pub fn normalize_ascii(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter_map(|c| {
            let c = match c {
                'а' => 'a',
                'с' => 'c',
                c => c,
            };
            c.is_ascii_alphanumeric().then_some(c)
        })
        .collect()
}

/// Decides whether a database row belongs to the requested (category, sub)
/// pair. First match wins: canonical label equality, then grade code, then
/// keyword stems. Pairs with no registered rule match everything.
pub fn matches_subcategory(
    category: &str,
    sub: &str,
    subtype: &str,
    name: &str,
    size: &str,
) -> bool {
    if sub.is_empty() {
        return true;
    }
    let Some(rule) = SUB_RULES
        .iter()
        .find(|r| r.category == category && r.sub == sub)
    else {
        return true;
    };

    if normalize_label(subtype) == normalize_label(rule.label) {
        return true;
    }

    let blob = normalize_ascii(&format!("{subtype} {name} {size}"));
    if let Some(code) = rule.code {
        if blob.contains(code) {
            return true;
        }
    }
    rule.keywords.iter().any(|k| blob.contains(k))
}

/// Title-only matcher for the built-in fallback catalog. Must agree with
/// [`matches_subcategory`] on titles both rule sets know about.
pub fn legacy_title_matches(category: &str, sub: &str, title: &str) -> bool {
    if sub.is_empty() {
        return true;
    }
    let Some(rule) = LEGACY_RULES
        .iter()
        .find(|r| r.category == category && r.sub == sub)
    else {
        return true;
    };
    let title = title.to_lowercase();
    rule.stems.iter().any(|s| title.contains(s))
}

/// Listing order after sub-category filtering: ascending by normalized
/// subtype label, ties broken by ascending price.
pub fn sort_for_listing(rows: &mut [ProductRow]) {
    rows.sort_by(|a, b| {
        normalize_label(&a.subtype)
            .cmp(&normalize_label(&b.subtype))
            .then_with(|| a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(subtype: &str, name: &str, price: f64) -> ProductRow {
        ProductRow {
            subtype: subtype.to_string(),
            name: name.to_string(),
            price,
            ..ProductRow::default()
        }
    }

    #[test]
    fn test_normalize_label_folds_lookalikes() {
        // Latin A500C and Cyrillic А500С normalize identically
        assert_eq!(
            normalize_label("Арматура A500C"),
            normalize_label("Арматура А500С")
        );
        assert_eq!(normalize_label("  Труба   квадратная "), "труба квадратная");
    }

    #[test]
    fn test_normalize_ascii_strips_cyrillic() {
        assert_eq!(normalize_ascii("Арматура А500С 12мм"), "aaaa500c12");
        // the Cyrillic а in "Труба" folds to Latin, the rest drops out
        assert_eq!(normalize_ascii("Труба 40x20"), "a40x20");
    }

    #[test]
    fn test_label_match_wins() {
        assert!(matches_subcategory(
            "profile-pipe",
            "kvadratnaya",
            "Труба квадратная",
            "Труба 40x20",
            "40x20",
        ));
        assert!(!matches_subcategory(
            "profile-pipe",
            "kvadratnaya",
            "Труба прямоугольная",
            "Труба 60x40",
            "60x40",
        ));
    }

    #[test]
    fn test_rebar_grade_codes() {
        assert!(matches_subcategory("rebar", "a500c", "", "Арматура А500С 12мм", ""));
        assert!(!matches_subcategory("rebar", "a500c", "", "Арматура А400 10мм", ""));
        assert!(matches_subcategory("rebar", "a400", "", "Арматура А400 10мм", ""));
    }

    #[test]
    fn test_unregistered_sub_matches_everything() {
        assert!(matches_subcategory("rebar", "no-such-sub", "", "Арматура А400", ""));
        assert!(legacy_title_matches("rebar", "no-such-sub", "Арматура А400"));
        assert!(matches_subcategory("no-such-category", "x", "", "что угодно", ""));
    }

    #[test]
    fn test_keyword_match_on_transliteration() {
        assert!(matches_subcategory(
            "sheet",
            "ocinkovanniy",
            "",
            "Sheet ocinkovanniy 2mm",
            "",
        ));
        assert!(!matches_subcategory("sheet", "ocinkovanniy", "", "Лист стальной 3мм", ""));
    }

    #[test]
    fn test_matchers_agree_on_shared_fixtures() {
        // The database matcher and the fallback-catalog matcher must answer
        // the same on titles both rule sets understand.
        let fixtures = [
            ("rebar", "a500c", "Арматура А500С 12мм", true),
            ("rebar", "a500c", "Арматура А400 10мм", false),
            ("rebar", "a400", "Арматура А400 10мм", true),
            ("rebar", "unknown-grade", "Арматура А800", true),
        ];
        for (category, sub, title, expected) in fixtures {
            assert_eq!(
                matches_subcategory(category, sub, "", title, ""),
                expected,
                "db matcher on {title} / {sub}"
            );
            assert_eq!(
                legacy_title_matches(category, sub, title),
                expected,
                "legacy matcher on {title} / {sub}"
            );
        }
    }

    #[test]
    fn test_sort_by_label_then_price() {
        let mut rows = vec![
            row("Труба квадратная", "b", 300.0),
            row("Труба бесшовная", "a", 500.0),
            row("Труба квадратная", "c", 100.0),
        ];
        sort_for_listing(&mut rows);
        assert_eq!(rows[0].name, "a");
        assert_eq!(rows[1].name, "c");
        assert_eq!(rows[2].name, "b");
    }
}
