use super::*;
use proptest::prelude::*;
use serde_json::json;

fn ann() -> UserProfile {
    UserProfile {
        first_name: "Ann".into(),
        last_name: "Lee".into(),
        profile_pic: "https://example.com/ann.jpg".into(),
        locale: "en_US".into(),
        timezone: Number::from(-7),
        gender: "female".into(),
    }
}

fn params(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

// --- user id extraction ---

#[test]
fn test_extract_v1_sender_id() {
    let body = json!({
        "result": {
            "originalRequest": {"data": {"data": {"sender": {"id": 1234567890}}}}
        }
    });
    assert_eq!(extract_user_id(&body), Some(UserId::new("1234567890")));
}

#[test]
fn test_extract_v2_sender_id() {
    let body = json!({
        "session": "projects/p/agent/sessions/s1",
        "queryResult": {
            "originalDetectIntentRequest": {
                "payload": {"data": {"sender": {"id": "2096738230359422"}}}
            }
        }
    });
    assert_eq!(extract_user_id(&body), Some(UserId::new("2096738230359422")));
}

#[test]
fn test_extract_v1_wins_over_v2() {
    let body = json!({
        "result": {"originalRequest": {"data": {"data": {"sender": {"id": 1}}}}},
        "queryResult": {
            "originalDetectIntentRequest": {"payload": {"data": {"sender": {"id": 2}}}}
        }
    });
    assert_eq!(extract_user_id(&body), Some(UserId::new("1")));
}

#[test]
fn test_extract_v1_discriminator_without_path_is_miss() {
    // v1 marker present but only the v2 path is populated
    let body = json!({
        "result": {},
        "queryResult": {
            "originalDetectIntentRequest": {"payload": {"data": {"sender": {"id": 2}}}}
        }
    });
    assert_eq!(extract_user_id(&body), None);
}

#[test]
fn test_extract_falsy_discriminator_falls_through() {
    for result in [json!(null), json!(false), json!(0), json!("")] {
        let body = json!({
            "result": result.clone(),
            "queryResult": {
                "originalDetectIntentRequest": {"payload": {"data": {"sender": {"id": 7}}}}
            }
        });
        assert_eq!(extract_user_id(&body), Some(UserId::new("7")), "result = {}", result);
    }
}

#[test]
fn test_extract_truthy_scalar_discriminator_selects_v1() {
    let body = json!({
        "result": true,
        "queryResult": {
            "originalDetectIntentRequest": {"payload": {"data": {"sender": {"id": 7}}}}
        }
    });
    assert_eq!(extract_user_id(&body), None);
}

#[test]
fn test_extract_unknown_shapes_yield_none() {
    for body in [
        json!({}),
        json!(null),
        json!("queryResult"),
        json!([{"queryResult": {}}]),
        json!({"queryResult": {"originalDetectIntentRequest": "oops"}}),
        json!({"queryResult": {"originalDetectIntentRequest": {"payload": {"data": []}}}}),
        json!({"queryResult": {"originalDetectIntentRequest": {"payload": {"data": {"sender": {"id": true}}}}}}),
        json!({"queryResult": {"originalDetectIntentRequest": {"payload": {"data": {"sender": {"id": ""}}}}}}),
    ] {
        assert_eq!(extract_user_id(&body), None, "body: {}", body);
    }
}

// --- substitution ---

#[test]
fn test_substitute_first_name() {
    let tree = json!({"fulfillmentText": "Hello #user_profile.firstName!"});
    let out = substitute(&tree, "user_profile", &params(json!({"firstName": "Ann"})));
    assert_eq!(out, json!({"fulfillmentText": "Hello Ann!"}));
}

#[test]
fn test_substitute_replaces_every_occurrence() {
    let tree = json!("#ctx.a and #ctx.a again");
    let out = substitute(&tree, "ctx", &params(json!({"a": "x"})));
    assert_eq!(out, json!("x and x again"));
}

#[test]
fn test_substitute_walks_nested_arrays_and_objects() {
    let tree = json!({
        "fulfillmentMessages": [
            {"text": {"text": ["Hi #user_profile.firstName", "#user_profile.lastName"]}},
            {"card": {"title": "#user_profile.firstName #user_profile.lastName", "imageUri": "#user_profile.profilePic"}}
        ],
        "payload": {"facebook": {"text": "Bye #user_profile.firstName"}}
    });
    let out = substitute(&tree, USER_PROFILE_CONTEXT, &ann().to_parameters());
    assert_eq!(
        out,
        json!({
            "fulfillmentMessages": [
                {"text": {"text": ["Hi Ann", "Lee"]}},
                {"card": {"title": "Ann Lee", "imageUri": "https://example.com/ann.jpg"}}
            ],
            "payload": {"facebook": {"text": "Bye Ann"}}
        })
    );
}

#[test]
fn test_substitute_leaves_keys_and_scalars_alone() {
    let tree = json!({"#ctx.a": 1, "flag": true, "none": null, "n": 2.5});
    let out = substitute(&tree, "ctx", &params(json!({"a": "x"})));
    assert_eq!(out, tree);
}

#[test]
fn test_substitute_renders_non_string_values_as_json_text() {
    let tree = json!("tz=#user_profile.timezone ok=#user_profile.ok nil=#user_profile.nil");
    let out = substitute(
        &tree,
        "user_profile",
        &params(json!({"timezone": 5.5, "ok": false, "nil": null})),
    );
    assert_eq!(out, json!("tz=5.5 ok=false nil=null"));
}

#[test]
fn test_substitute_does_not_touch_input() {
    let tree = json!({"fulfillmentText": "Hi #user_profile.firstName"});
    let before = tree.clone();
    let _ = substitute(&tree, USER_PROFILE_CONTEXT, &ann().to_parameters());
    assert_eq!(tree, before);
}

#[test]
fn test_substitute_other_context_untouched() {
    let tree = json!("#order.firstName / #user_profile.firstName");
    let out = substitute(&tree, USER_PROFILE_CONTEXT, &ann().to_parameters());
    assert_eq!(out, json!("#order.firstName / Ann"));
}

#[test]
fn test_substitute_prefix_overlap_follows_parameter_order() {
    // firstName comes before firstName2, so it eats the prefix of the longer token
    let tree = json!("#p.firstName2");
    let out = substitute(
        &tree,
        "p",
        &params(json!({"firstName": "Ann", "firstName2": "Bob"})),
    );
    assert_eq!(out, json!("Ann2"));

    let out = substitute(
        &tree,
        "p",
        &params(json!({"firstName2": "Bob", "firstName": "Ann"})),
    );
    assert_eq!(out, json!("Bob"));
}

#[test]
fn test_substitute_later_parameter_expands_inserted_text() {
    let tree = json!("#p.a");
    let out = substitute(&tree, "p", &params(json!({"a": "#p.b", "b": "done"})));
    assert_eq!(out, json!("done"));

    // but an earlier parameter is not revisited
    let out = substitute(&tree, "p", &params(json!({"b": "done", "a": "#p.b"})));
    assert_eq!(out, json!("#p.b"));
}

proptest! {
    #[test]
    fn substitute_without_placeholders_is_identity(s in "[^#]{0,64}", n in any::<i64>(), b in any::<bool>()) {
        let tree = json!({"text": s, "items": [s, n, b, null], "nested": {"k": s}});
        let out = substitute(&tree, USER_PROFILE_CONTEXT, &ann().to_parameters());
        prop_assert_eq!(out, tree);
    }

    #[test]
    fn substitute_never_panics(s in "\\PC*") {
        let _ = substitute(&json!(s), "p", &params(json!({"": "x", "a": 1})));
    }
}

// --- injection ---

#[test]
fn test_inject_sets_single_context() {
    let tree = json!({
        "fulfillmentText": "hi",
        "outputContexts": [
            {"name": "s1/contexts/old", "lifespanCount": 2},
            {"name": "s1/contexts/older"}
        ]
    });
    let envelope = inject(tree, "s1", "user_profile", params(json!({"firstName": "Ann"}))).unwrap();
    assert_eq!(
        envelope.output_contexts,
        Some(vec![OutputContext {
            name: "s1/contexts/user_profile".into(),
            lifespan_count: 5,
            parameters: params(json!({"firstName": "Ann"})),
        }])
    );
    assert_eq!(envelope.fulfillment_text, "hi");
}

#[test]
fn test_inject_ignores_malformed_prior_contexts() {
    let tree = json!({"fulfillmentText": "hi", "outputContexts": "garbage"});
    let envelope = inject(tree, "s", "c", Map::new()).unwrap();
    assert_eq!(envelope.output_contexts.map(|c| c.len()), Some(1));
}

#[test]
fn test_inject_twice_does_not_accumulate() {
    let first = inject(json!({"fulfillmentText": "x"}), "s", "a", Map::new()).unwrap();
    let again = Reply::Envelope(first).to_body();
    let second = inject(again, "s", "b", Map::new()).unwrap();
    let contexts = second.output_contexts.unwrap();
    assert_eq!(contexts.len(), 1);
    assert_eq!(contexts[0].name, "s/contexts/b");
}

#[test]
fn test_inject_keeps_other_fields() {
    let tree = json!({
        "fulfillmentText": "hi",
        "source": "bridge",
        "payload": {"facebook": {"text": "x"}},
        "queryText": "hello",
        "intent": {"displayName": "greet"}
    });
    let envelope = inject(tree, "s", "c", Map::new()).unwrap();
    assert_eq!(envelope.source, Some(json!("bridge")));
    assert_eq!(envelope.payload, Some(json!({"facebook": {"text": "x"}})));
    assert_eq!(envelope.extra.get("queryText"), Some(&json!("hello")));
    assert_eq!(envelope.extra.get("intent"), Some(&json!({"displayName": "greet"})));
}

#[test]
fn test_inject_rejects_non_object() {
    let err = inject(json!(["not", "an", "object"]), "s", "c", Map::new()).unwrap_err();
    assert!(matches!(err, crate::errors::BridgeError::Shape(_)));
    assert!(err.to_string().contains("an array"));
}

#[test]
fn test_inject_passes_unusual_field_types_through() {
    let tree = json!({
        "fulfillmentText": 42,
        "source": 5,
        "fulfillmentMessages": {"text": {"text": ["hi"]}},
        "payload": "raw",
        "followupEventInput": ["E"]
    });
    let envelope = inject(tree, "s", "c", Map::new()).unwrap();
    let body = Reply::from(envelope).to_body();
    assert_eq!(body["fulfillmentText"], json!(42));
    assert_eq!(body["source"], json!(5));
    assert_eq!(body["fulfillmentMessages"], json!({"text": {"text": ["hi"]}}));
    assert_eq!(body["payload"], json!("raw"));
    assert_eq!(body["followupEventInput"], json!(["E"]));
    assert_eq!(body["outputContexts"][0]["name"], "s/contexts/c");
}

#[test]
fn test_apply_substitutes_and_injects() {
    let query_result = json!({"fulfillmentText": "profile: #user_profile.firstName"});
    let envelope = ContextInjection::user_profile(&ann())
        .apply("s1", &query_result)
        .unwrap();
    assert_eq!(envelope.fulfillment_text, "profile: Ann");
    let contexts = envelope.output_contexts.unwrap();
    assert_eq!(contexts[0].name, "s1/contexts/user_profile");
    assert_eq!(contexts[0].lifespan_count, CONTEXT_LIFESPAN);
    assert_eq!(contexts[0].parameters["timezone"], json!(-7));
}

// --- reply body ---

#[test]
fn test_text_reply_body() {
    let body = Reply::from("Hi").to_body();
    assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"fulfillmentText":"Hi"}"#);
}

#[test]
fn test_text_only_envelope_has_no_extra_keys() {
    let body = Reply::from(ResponseEnvelope::text("Hi")).to_body();
    assert_eq!(body, json!({"fulfillmentText": "Hi"}));
}

#[test]
fn test_envelope_body_carries_present_fields_only() {
    let envelope: ResponseEnvelope = serde_json::from_value(json!({
        "fulfillmentText": "hi",
        "fulfillmentMessages": [{"text": {"text": ["hi"]}}],
        "source": null,
        "followupEventInput": {"name": "WELCOME"},
        "queryText": "hello"
    }))
    .unwrap();
    let body = Reply::from(envelope).to_body();
    assert_eq!(
        body,
        json!({
            "fulfillmentText": "hi",
            "fulfillmentMessages": [{"text": {"text": ["hi"]}}],
            "followupEventInput": {"name": "WELCOME"}
        })
    );
}

#[test]
fn test_missing_fulfillment_text_defaults_to_empty() {
    let envelope: ResponseEnvelope = serde_json::from_value(json!({"fulfillmentText": null})).unwrap();
    assert_eq!(Reply::from(envelope).to_body(), json!({"fulfillmentText": ""}));
}

#[test]
fn test_body_key_order() {
    let envelope = inject(
        json!({"followupEventInput": {"name": "E"}, "payload": {}, "fulfillmentText": "t"}),
        "s",
        "c",
        Map::new(),
    )
    .unwrap();
    let body = Reply::from(envelope).to_body();
    let keys: Vec<&str> = body.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        ["fulfillmentText", "payload", "outputContexts", "followupEventInput"]
    );
}

// --- profile parameters ---

#[test]
fn test_profile_parameters_order() {
    let keys: Vec<String> = ann().to_parameters().keys().cloned().collect();
    assert_eq!(
        keys,
        ["firstName", "lastName", "profilePic", "locale", "timezone", "gender"]
    );
}

#[test]
fn test_profile_serializes_camel_case() {
    let value = serde_json::to_value(ann()).unwrap();
    assert_eq!(value, Value::Object(ann().to_parameters()));
}

// --- reply building ---

#[test]
fn test_build_reply_v2_request() {
    let request = json!({
        "session": "s1",
        "queryResult": {"fulfillmentText": "profile: #user_profile.firstName"}
    });
    let reply = build_reply(&request, &ContextInjection::user_profile(&ann())).unwrap();
    assert_eq!(
        reply.to_body(),
        json!({
            "fulfillmentText": "profile: Ann",
            "outputContexts": [{
                "name": "s1/contexts/user_profile",
                "lifespanCount": 5,
                "parameters": Value::Object(ann().to_parameters())
            }]
        })
    );
}

#[test]
fn test_build_reply_requires_session() {
    let request = json!({"queryResult": {"fulfillmentText": "x"}});
    let err = build_reply(&request, &ContextInjection::user_profile(&ann())).unwrap_err();
    assert!(err.to_string().contains("session"));
}

#[test]
fn test_build_reply_requires_query_result_object() {
    for request in [json!({"session": "s"}), json!({"session": "s", "queryResult": "text"})] {
        let err = build_reply(&request, &ContextInjection::user_profile(&ann())).unwrap_err();
        assert!(err.to_string().contains("queryResult"));
    }
}
