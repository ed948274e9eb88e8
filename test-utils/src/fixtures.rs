//! Ready-made fragments and class specs.

use pact_consumer::{PactFragment, ProviderSelection, ProviderType, TestClassSpec};
use pact_model::{HttpInteraction, MessageInteraction, Request, Response};
use serde_json::json;

/// A request/response fragment declaring one `GET /{name}` interaction.
#[must_use]
pub fn http_fragment(name: &str, consumer: &str, provider: &str) -> PactFragment {
    let description = format!("get {name}");
    let path = format!("/{name}");
    PactFragment::request(name, consumer, provider, move |builder| {
        builder
            .interaction(HttpInteraction::new(
                description.clone(),
                Request::new("GET", path.clone()),
                Response::new(200).with_body(json!({"ok": true})),
            ))
            .build()
    })
}

/// A request/response fragment declaring `count` interactions.
#[must_use]
pub fn http_fragment_with(
    name: &str,
    consumer: &str,
    provider: &str,
    count: usize,
) -> PactFragment {
    let name_owned = name.to_string();
    PactFragment::request(name, consumer, provider, move |mut builder| {
        for i in 0..count {
            builder = builder.interaction(HttpInteraction::new(
                format!("{name_owned} interaction {i}"),
                Request::new("GET", format!("/{name_owned}/{i}")),
                Response::new(200),
            ));
        }
        builder.build()
    })
}

/// A message fragment declaring one event with a small JSON payload.
#[must_use]
pub fn message_fragment(name: &str, consumer: &str, provider: &str) -> PactFragment {
    let description = format!("{name} event");
    PactFragment::message(name, consumer, provider, move |builder| {
        builder
            .message(
                MessageInteraction::new(description.clone())
                    .with_contents(json!({"event": description.clone()})),
            )
            .build()
    })
}

/// A class spec with one synchronous provider and one matching fragment.
#[must_use]
pub fn sync_class(class: &str, consumer: &str, provider: &str) -> TestClassSpec {
    TestClassSpec::new(class)
        .with_provider(
            ProviderSelection::for_provider(provider).with_type(ProviderType::Synchronous),
        )
        .with_fragment(http_fragment("token_pact", consumer, provider))
}

/// A class spec with one asynchronous provider and one matching fragment.
#[must_use]
pub fn async_class(class: &str, consumer: &str, provider: &str) -> TestClassSpec {
    TestClassSpec::new(class)
        .with_provider(
            ProviderSelection::for_provider(provider).with_type(ProviderType::Asynchronous),
        )
        .with_fragment(message_fragment("revocation_pact", consumer, provider))
}
