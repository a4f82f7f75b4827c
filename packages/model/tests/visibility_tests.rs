//! Visibility rules evaluated against a catalog, end to end from JSON

use customfly_model::{is_visible, pages_from_json, Catalog, CatalogSelection};

const DESIGN: &str = r#"[
    {
        "id": "front",
        "name": "Side 1",
        "elements": [
            { "id": "name", "type": "text", "x": 0, "y": 0, "rotation": 0, "opacity": 100, "zIndex": 1, "text": "Ada" },
            {
                "id": "engrave", "type": "text", "x": 0, "y": 0, "rotation": 0, "opacity": 100, "zIndex": 2,
                "logic": {
                    "rules": [{ "id": "r1", "sourceType": "shopify_option", "sourceKey": "Finish", "operator": "equals", "value": "Engraved" }],
                    "matchType": "all",
                    "action": "show"
                }
            },
            {
                "id": "sticker", "type": "image", "x": 0, "y": 0, "rotation": 0, "opacity": 100, "zIndex": 3,
                "logic": {
                    "rules": [{ "id": "r2", "sourceType": "shopify_option", "sourceKey": "Color", "operator": "equals", "value": "Red" }],
                    "matchType": "all",
                    "action": "show"
                }
            }
        ]
    }
]"#;

const CATALOG: &str = r#"{
    "options": [{ "name": "Color", "position": 1, "values": ["Red", "Blue"] }],
    "variants": [
        { "id": "1", "title": "Red", "price": "9.00", "option1": "Red" },
        { "id": "2", "title": "Blue", "price": "9.00", "option1": "Blue" }
    ]
}"#;

fn visible_ids(selection: &CatalogSelection) -> Vec<String> {
    let pages = pages_from_json(DESIGN).unwrap();
    pages[0]
        .elements
        .iter()
        .filter(|e| is_visible(e, selection))
        .map(|e| e.id().to_string())
        .collect()
}

#[test]
fn test_variant_selection_drives_visibility() {
    let catalog: Catalog = serde_json::from_str(CATALOG).unwrap();

    assert_eq!(visible_ids(&catalog.selection_for_variant("1")), vec!["name", "sticker"]);
    assert_eq!(visible_ids(&catalog.selection_for_variant("2")), vec!["name"]);
}

#[test]
fn test_rule_on_removed_option_never_shows() {
    // "Finish" is not an option of this catalog
    let catalog: Catalog = serde_json::from_str(CATALOG).unwrap();
    let visible = visible_ids(&catalog.selection_for_variant("1"));
    assert!(!visible.contains(&"engrave".to_string()));
}
