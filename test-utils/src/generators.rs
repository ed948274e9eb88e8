//! Proptest strategies over the contract model.

use pact_model::{
    HttpInteraction, Interaction, MessageInteraction, Pact, PactSpecVersion, Request, Response,
};
use proptest::prelude::*;

/// Strategy for kebab-case service names.
pub fn service_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{1,8}(-[a-z0-9]{1,8}){0,2}"
}

/// Strategy for HTTP methods the harness meets in practice.
pub fn http_method() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("GET".to_string()),
        Just("POST".to_string()),
        Just("PUT".to_string()),
        Just("DELETE".to_string()),
    ]
}

/// Strategy for request paths.
pub fn request_path() -> impl Strategy<Value = String> {
    "(/[a-z0-9]{1,10}){1,3}"
}

/// Strategy for request/response interactions.
pub fn http_interaction() -> impl Strategy<Value = Interaction> {
    (
        "[a-z ]{3,24}",
        http_method(),
        request_path(),
        prop_oneof![Just(200u16), Just(201), Just(204), Just(404), Just(500)],
    )
        .prop_map(|(description, method, path, status)| {
            Interaction::Http(HttpInteraction::new(
                description,
                Request::new(method, path),
                Response::new(status),
            ))
        })
}

/// Strategy for message interactions.
pub fn message_interaction() -> impl Strategy<Value = Interaction> {
    "[a-z ]{3,24}".prop_map(|description| Interaction::Message(MessageInteraction::new(description)))
}

/// Strategy for specification versions.
pub fn spec_version() -> impl Strategy<Value = PactSpecVersion> {
    prop_oneof![Just(PactSpecVersion::V3), Just(PactSpecVersion::V4)]
}

/// Strategy for contracts with up to `max_interactions` HTTP interactions.
pub fn http_pact(max_interactions: usize) -> impl Strategy<Value = Pact> {
    (
        service_name(),
        service_name(),
        prop::collection::vec(http_interaction(), 0..=max_interactions),
    )
        .prop_map(|(consumer, provider, interactions)| {
            let mut pact = Pact::new(consumer, provider);
            pact.interactions = interactions;
            pact
        })
}
