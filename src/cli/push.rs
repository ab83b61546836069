use crate::context::{Context, SpanContext};
use crate::endpoint::PushClient;
use crate::error::Result;
use crate::service::Operation;
use crate::transport::client::HttpEndpoint;
use crate::types::Event;

/// Push one event through a remote gateway and print where it landed.
pub async fn execute(url: &str, name: &str, payload: &str, user_id: i64) -> Result<()> {
    let payload: serde_json::Value = serde_json::from_str(payload)?;
    let client = PushClient::new(HttpEndpoint::new(url));

    let ctx = Context::with_span(SpanContext::root());
    let placement = client.push(ctx, Event::new(name, payload, user_id)).await?;

    println!("partition={} offset={}", placement.partition, placement.offset);
    Ok(())
}
