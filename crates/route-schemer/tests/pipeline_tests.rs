//! Registry-to-response pipeline tests without the HTTP layer

use std::fs;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use route_schemer::{
    Direction, Invocation, ParamInput, ParameterBag, RouteKey, RouteSchemer, SchemaRegistry,
    SchemerError, ValidateOptions, filter,
};
use serde_json::{Map, Value, json};
use tempfile::TempDir;

struct OrdersRouteSchemer;

impl RouteSchemer for OrdersRouteSchemer {
    const CONTROLLER: &'static str = "Shop::OrdersController";

    fn actions() -> &'static [&'static str] {
        &["create", "show"]
    }

    fn schema(action: &str, direction: Direction) -> Option<Value> {
        match (action, direction) {
            ("create", Direction::Request) => Some(json!({
                "type": "object",
                "required": ["items"],
                "properties": {
                    "note": { "type": "string" },
                    "total": { "type": "number" },
                    "items": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "required": ["sku"],
                            "properties": { "sku": { "type": "string" }, "qty": { "type": "integer" } }
                        }
                    }
                }
            })),
            ("show", Direction::Response) => Some(json!({
                "type": "object",
                "required": ["id"],
                "properties": { "id": { "type": "integer" } }
            })),
            _ => None,
        }
    }
}

fn orders_registry() -> Arc<SchemaRegistry> {
    let mut registry = SchemaRegistry::new();
    assert_eq!(registry.register_schemer::<OrdersRouteSchemer>().unwrap(), 2);
    Arc::new(registry)
}

#[test]
fn test_array_of_objects_from_query() {
    let params = ParameterBag::from_query(
        "items[][sku]=A1&items[][qty]=2&items[][sku]=B2&items[][qty]=x1&total=9.50&coupon=FREE",
    );
    let mut invocation = Invocation::new(orders_registry(), RouteKey::new("shop/orders", "create"), params);

    let err = invocation.validated_params(ValidateOptions::default()).unwrap_err();
    let failure = err.as_validation().unwrap();
    assert_eq!(failure.details()[0].data_pointer, "/items/1/qty");

    let params = ParameterBag::from_query("items[][sku]=A1&items[][qty]=2&total=9.50&coupon=FREE");
    let mut invocation = Invocation::new(orders_registry(), RouteKey::new("Shop::Orders", "create"), params);
    let permitted = invocation.validated_params(ValidateOptions::default()).unwrap();
    assert_eq!(permitted, json!({ "total": 9.5, "items": [{ "sku": "A1", "qty": 2 }] }));
}

#[test]
fn test_response_schema_from_trait() {
    let mut invocation = Invocation::new(orders_registry(), RouteKey::new("shop/orders", "show"), ParameterBag::new());

    assert_eq!(invocation.validated_response(json!({ "id": 1 })).unwrap(), json!({ "id": 1 }));
    assert!(matches!(
        invocation.validated_params(ValidateOptions::default()),
        Err(SchemerError::MissingSchema)
    ));
}

#[test]
fn test_schema_directory_round() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("application.json"),
        json!({ "actions": { "index": { "request": { "type": "object", "properties": { "page": { "type": "integer" } } } } } })
            .to_string(),
    )
    .unwrap();
    fs::write(
        temp.path().join("users_route_schemer.json"),
        json!({
            "controller": "admin/users",
            "actions": { "create": { "request": { "type": "object", "properties": { "name": { "type": "string" } } } } }
        })
        .to_string(),
    )
    .unwrap();

    let registry = Arc::new(SchemaRegistry::load_dir(temp.path()).unwrap());
    assert_eq!(registry.len(), 2);

    let mut create = Invocation::new(
        Arc::clone(&registry),
        RouteKey::new("Admin::UsersController", "create"),
        ParameterBag::from_query("name=Joe&role=admin"),
    );
    assert_eq!(create.validated_params(ValidateOptions::default()).unwrap(), json!({ "name": "Joe" }));

    let mut index = Invocation::new(registry, RouteKey::new("admin/users", "index"), ParameterBag::from_query("page=3"));
    assert_eq!(index.validated_params(ValidateOptions::default()).unwrap(), json!({ "page": 3 }));
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        "[a-z0-9]{0,6}".prop_map(Value::from),
    ]
}

proptest! {
    #[test]
    fn prop_filtered_keys_are_declared(
        input in prop::collection::btree_map("[a-e]", scalar(), 0..6),
        declared in prop::collection::btree_set("[a-e]", 0..5),
    ) {
        let properties: Map<String, Value> = declared
            .iter()
            .map(|name| (name.clone(), json!({ "type": "string" })))
            .collect();
        let schema = json!({ "type": "object", "properties": properties });
        let map: Map<String, Value> = input.into_iter().collect();

        for params in [ParamInput::bag(ParameterBag::from_map(map.clone())), ParamInput::plain(map.clone())] {
            let filtered = filter(&schema, &params).unwrap();
            for key in filtered.keys() {
                prop_assert!(declared.contains(key));
                prop_assert_eq!(filtered.get(key), map.get(key));
            }
        }
    }
}
