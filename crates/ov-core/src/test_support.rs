//! Shared test fixtures

use ov_model::PackageModel;

/// Package with a three-level geography, a single-level program hierarchy,
/// a location hierarchy and two column hierarchies
pub(crate) fn package_model() -> PackageModel {
    serde_json::from_value(serde_json::json!({
        "id": "budget-2016",
        "meta": { "countryCode": "DE" },
        "measures": [{ "key": "amount" }, { "key": "revenue" }],
        "hierarchies": [
            { "dimensions": [{ "key": "region" }, { "key": "country" }, { "key": "city" }] },
            { "dimensions": [{ "key": "program" }] }
        ],
        "dateTimeHierarchies": [
            { "dimensions": [
                { "key": "year", "dimensionType": "datetime" },
                { "key": "month", "dimensionType": "datetime" }
            ] }
        ],
        "locationHierarchies": [
            { "dimensions": [{ "key": "admin0" }, { "key": "admin1" }] }
        ],
        "columnHierarchies": [
            { "dimensions": [
                { "key": "program" },
                { "key": "quarter", "dimensionType": "datetime", "values": [{ "key": "Q1" }] }
            ] },
            { "dimensions": [
                { "key": "year", "dimensionType": "datetime",
                  "values": [{ "key": "2015" }, { "key": "2016" }] }
            ] }
        ]
    }))
    .expect("fixture package model is valid")
}
