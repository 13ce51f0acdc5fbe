mod common;

use std::time::Duration;

use chrono_tz::Tz;
use common::{RecordingChannel, ScriptedProvider, accepted_response, legacy_record};
use parcelbot::bot::{GENERIC_FAILURE_MESSAGE, HELP_MESSAGE, ParcelBot, START_MESSAGE};
use parcelbot::core::models::CarrierHint;
use parcelbot::tracking::{CarrierResolver, ResolverConfig, SettlePolicy};

const CHAT_ID: i64 = 4242;

fn resolver(provider: ScriptedProvider) -> CarrierResolver<ScriptedProvider> {
    CarrierResolver::new(
        provider,
        ResolverConfig {
            register_before_query: false,
            fallback_carriers: CarrierHint::ALL.to_vec(),
            settle: SettlePolicy {
                initial_delay: Duration::from_millis(1),
                requery_attempts: 0,
                max_wait: Duration::from_millis(10),
            },
        },
    )
}

fn bot_with(
    provider: ScriptedProvider,
    channel: RecordingChannel,
) -> ParcelBot<ScriptedProvider, RecordingChannel> {
    ParcelBot::new(Some(resolver(provider)), channel, Tz::UTC)
}

fn only_reply(bot: &ParcelBot<ScriptedProvider, RecordingChannel>) -> String {
    let sent = bot.channel().sent();
    assert_eq!(sent.len(), 1, "expected exactly one reply, got {sent:?}");
    assert_eq!(sent[0].0, CHAT_ID);
    sent[0].1.clone()
}

#[tokio::test]
async fn test_start_and_help_need_no_provider() {
    let bot = bot_with(ScriptedProvider::always_empty(), RecordingChannel::default());

    bot.handle_message(CHAT_ID, "/start").await.unwrap();
    bot.handle_message(CHAT_ID, "/help@parcel_bot").await.unwrap();

    let sent = bot.channel().sent();
    assert_eq!(sent[0].1, START_MESSAGE);
    assert_eq!(sent[1].1, HELP_MESSAGE);
    assert!(bot.resolver().unwrap().provider().calls().is_empty());
}

#[tokio::test]
async fn test_short_number_is_rejected_without_lookup() {
    let bot = bot_with(ScriptedProvider::always_empty(), RecordingChannel::default());

    bot.handle_message(CHAT_ID, "/track 1234").await.unwrap();

    let reply = only_reply(&bot);
    assert!(reply.contains("at least 8 characters"), "got: {reply}");
    assert!(bot.resolver().unwrap().provider().calls().is_empty());
}

#[tokio::test]
async fn test_found_shipment_is_rendered() {
    let provider =
        ScriptedProvider::new(|_, _| Ok(accepted_response(legacy_record("5532417763"))));
    let bot = bot_with(provider, RecordingChannel::default());

    bot.handle_message(CHAT_ID, "/track 5532417763").await.unwrap();

    let reply = only_reply(&bot);
    assert!(reply.contains("<code>5532417763</code>"));
    assert!(reply.contains("<b>Status:</b> In Transit"));
    assert!(reply.contains("<b>Location:</b> Memphis"));
    assert!(reply.contains("<b>Carrier:</b> DHL Express"));
}

#[tokio::test]
async fn test_bare_number_triggers_lookup() {
    let provider =
        ScriptedProvider::new(|_, _| Ok(accepted_response(legacy_record("5532417763"))));
    let bot = bot_with(provider, RecordingChannel::default());

    bot.handle_message(CHAT_ID, "5532417763").await.unwrap();

    assert_eq!(bot.resolver().unwrap().provider().query_carriers(), vec![None]);
    assert!(only_reply(&bot).contains("In Transit"));
}

#[tokio::test]
async fn test_unknown_number_gets_not_found_reply() {
    let bot = bot_with(ScriptedProvider::always_empty(), RecordingChannel::default());

    bot.handle_message(CHAT_ID, "/track 5532417763").await.unwrap();

    let reply = only_reply(&bot);
    assert!(reply.contains("No information for <code>5532417763</code> yet"));
    assert_eq!(bot.resolver().unwrap().provider().query_carriers().len(), 4);
}

#[tokio::test]
async fn test_carrier_argument_is_tried_first_after_autodetection() {
    let bot = bot_with(ScriptedProvider::always_empty(), RecordingChannel::default());

    bot.handle_message(CHAT_ID, "/track JJD0001234567 dhl-paket")
        .await
        .unwrap();

    assert_eq!(
        bot.resolver().unwrap().provider().query_carriers(),
        vec![
            None,
            Some(CarrierHint::DhlPaket),
            Some(CarrierHint::DhlExpress),
            Some(CarrierHint::DhlSupplyChainApac),
        ]
    );
    assert!(only_reply(&bot).contains("<code>JJD0001234567</code>"));
}

#[tokio::test]
async fn test_missing_api_key_replies_generic_failure() {
    let bot: ParcelBot<ScriptedProvider, RecordingChannel> =
        ParcelBot::new(None, RecordingChannel::default(), Tz::UTC);

    bot.handle_message(CHAT_ID, "/track 5532417763").await.unwrap();

    assert_eq!(only_reply(&bot), GENERIC_FAILURE_MESSAGE);
}

#[tokio::test]
async fn test_delivery_failure_sends_one_apology_and_errors() {
    let bot = bot_with(ScriptedProvider::always_empty(), RecordingChannel::failing());

    let result = bot.handle_message(CHAT_ID, "/start").await;

    assert!(result.is_err());
    let sent = bot.channel().sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].1, START_MESSAGE);
    assert_eq!(sent[1].1, GENERIC_FAILURE_MESSAGE);
}

#[tokio::test]
async fn test_unrecognized_text_gets_hint() {
    let bot = bot_with(ScriptedProvider::always_empty(), RecordingChannel::default());

    bot.handle_message(CHAT_ID, "where is my parcel?").await.unwrap();

    assert!(only_reply(&bot).contains("/help"));
}
