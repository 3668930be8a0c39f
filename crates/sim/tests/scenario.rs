use std::sync::Arc;

use agora_products::Product;
use agora_sim::{MemorySink, RunOptions, Scenario, ScenarioError, SimError, run_scenario};

const TEA_SHOP: &str = include_str!("../scenarios/tea_shop.json");

fn fast() -> RunOptions {
    RunOptions::with_time_scale(0.01).unwrap()
}

#[test]
fn tea_shop_runs_to_completion() {
    let scenario = Scenario::from_json(TEA_SHOP).unwrap();
    let sink = Arc::new(MemorySink::new());

    let report = run_scenario(&scenario, fast(), sink.clone()).unwrap();

    let linden = Product::tea("Linden", 9, "Herbal");
    let indonezia = Product::coffee("Indonezia", 1, "5.05", "MEDIUM");
    let cherry = Product::tea("Wild Cherry", 5, "Black");
    let brasil = Product::coffee("Brasil", 7, "5.09", "MEDIUM");

    let cons1 = report.consumers.iter().find(|c| c.name == "cons1").unwrap();
    assert_eq!(
        cons1.order.as_ref().unwrap().items,
        vec![linden.clone(), cherry.clone(), indonezia]
    );

    let cons2 = report.consumers.iter().find(|c| c.name == "cons2").unwrap();
    assert_eq!(
        cons2.order.as_ref().unwrap().items,
        vec![brasil, linden.clone(), cherry.clone(), cherry]
    );

    assert_eq!(report.items_bought(), 7);
    assert_eq!(sink.lines().len(), 7);
    assert!(sink.lines().contains(&format!("cons1 bought {linden}")));

    assert_eq!(report.producers.len(), 2);
    let published: u64 = report.producers.iter().map(|p| p.published).sum();
    assert_eq!(report.stats.published, published);
    assert_eq!(report.stats.sold, 7);
    assert_eq!(report.stats.reserved, 0);
    assert_eq!(report.stats.carts, 2);
    assert!(report.stats.is_conserved());
}

#[test]
fn contended_stock_is_sold_exactly_once() {
    let consumers: Vec<String> = (0..6)
        .map(|n| {
            format!(
                r#"{{ "name": "cons{n}", "retry_wait_time": 0.001, "carts": [
                    [ {{ "type": "add", "product": "id1", "quantity": 5 }} ],
                    [ {{ "type": "add", "product": "id1", "quantity": 2 }},
                      {{ "type": "remove", "product": "id1", "quantity": 1 }} ]
                ] }}"#
            )
        })
        .collect();
    let json = format!(
        r#"{{
            "queue_size_per_producer": 3,
            "products": {{ "id1": {{ "product_type": "Tea", "name": "Linden", "type": "Herbal", "price": 9 }} }},
            "producers": [
                {{ "name": "prod1", "products": [["id1", 4, 0.0]], "republish_wait_time": 0.001 }},
                {{ "name": "prod2", "products": [["id1", 1, 0.0]], "republish_wait_time": 0.001 }}
            ],
            "consumers": [{}]
        }}"#,
        consumers.join(",")
    );
    let scenario = Scenario::from_json(&json).unwrap();

    let report = run_scenario(&scenario, RunOptions::default(), Arc::new(MemorySink::new())).unwrap();

    for consumer in &report.consumers {
        assert_eq!(consumer.items_bought(), 6, "{} got a short order", consumer.name);
    }
    assert_eq!(report.stats.sold, 36);
    assert_eq!(report.stats.reserved, 0);
    assert!(report.stats.is_conserved());
}

#[test]
fn bounded_retries_let_a_starved_consumer_finish() {
    let json = r#"{
        "queue_size_per_producer": 1,
        "products": { "id1": { "product_type": "Tea", "name": "Linden", "type": "Herbal", "price": 9 } },
        "consumers": [
            { "name": "cons1", "retry_wait_time": 0.001, "max_attempts": 3,
              "carts": [[ { "type": "add", "product": "id1", "quantity": 2 } ]] }
        ]
    }"#;
    let scenario = Scenario::from_json(json).unwrap();

    let report = run_scenario(&scenario, RunOptions::default(), Arc::new(MemorySink::new())).unwrap();

    let cons1 = &report.consumers[0];
    assert_eq!(cons1.abandoned, 2);
    assert!(cons1.order.as_ref().unwrap().items.is_empty());
    assert_eq!(report.stats.published, 0);
}

#[test]
fn invalid_scenario_never_starts() {
    let mut scenario = Scenario::from_json(TEA_SHOP).unwrap();
    scenario.queue_size_per_producer = 0;

    let err = run_scenario(&scenario, fast(), Arc::new(MemorySink::new())).unwrap_err();
    assert!(matches!(err, SimError::Scenario(ScenarioError::Invalid(_))));
}

#[test]
fn report_serializes_to_json() {
    let scenario = Scenario::from_json(TEA_SHOP).unwrap();
    let report = run_scenario(&scenario, fast(), Arc::new(MemorySink::new())).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["stats"]["sold"], 7);
    assert_eq!(json["consumers"].as_array().unwrap().len(), 2);
    assert_eq!(json["consumers"][0]["order"]["items"][0]["product_type"], "Tea");
}
