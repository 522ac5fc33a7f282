use crate::config::Config;
use crate::model::ServerError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const DEFAULT_FILTER: &str = "konnekt_match=debug,tower_http=debug,axum=info,warn";

#[cfg(feature = "telemetry")]
const SERVICE_NAME: &str = "konnekt-match";

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_telemetry(config: &Config) -> Result<(), ServerError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let json_layer = config.log_json.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .with_file(true)
            .json()
    });
    let plain_layer = (!config.log_json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_ansi(true)
    });

    let subscriber = Registry::default()
        .with(env_filter)
        .with(json_layer)
        .with(plain_layer);

    #[cfg(feature = "telemetry")]
    {
        if config.enable_telemetry {
            let tracer = jaeger_tracer(&config.jaeger_endpoint)?;
            subscriber
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .try_init()
                .map_err(|e| ServerError::Telemetry(e.to_string()))?;

            tracing::info!(
                "Telemetry initialized with Jaeger endpoint: {}",
                config.jaeger_endpoint
            );
            return Ok(());
        }
    }

    subscriber
        .try_init()
        .map_err(|e| ServerError::Telemetry(e.to_string()))?;

    if config.enable_telemetry {
        tracing::warn!(
            "Telemetry requested but the binary was built without the `telemetry` feature"
        );
    } else {
        tracing::debug!("Telemetry disabled");
    }
    Ok(())
}

#[cfg(feature = "telemetry")]
fn jaeger_tracer(endpoint: &str) -> Result<opentelemetry::sdk::trace::Tracer, ServerError> {
    use opentelemetry::sdk::propagation::TraceContextPropagator;
    use opentelemetry::sdk::{
        trace::{self, RandomIdGenerator, Sampler},
        Resource,
    };
    use opentelemetry::{global, KeyValue};

    global::set_text_map_propagator(TraceContextPropagator::new());

    opentelemetry_jaeger::new_collector_pipeline()
        .with_service_name(SERVICE_NAME)
        .with_endpoint(endpoint)
        .with_isahc()
        .with_trace_config(
            trace::config()
                .with_sampler(Sampler::AlwaysOn)
                .with_id_generator(RandomIdGenerator::default())
                .with_max_events_per_span(64)
                .with_max_attributes_per_span(16)
                .with_resource(Resource::new(vec![
                    KeyValue::new("service.name", SERVICE_NAME),
                    KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
                ])),
        )
        .with_timeout(std::time::Duration::from_secs(2))
        .install_batch(opentelemetry::runtime::Tokio)
        .map_err(|e| ServerError::Telemetry(e.to_string()))
}

/// Flushes pending spans. No-op unless Jaeger export was enabled.
pub fn shutdown_telemetry(config: &Config) {
    #[cfg(feature = "telemetry")]
    {
        if config.enable_telemetry {
            opentelemetry::global::shutdown_tracer_provider();
        }
    }
    #[cfg(not(feature = "telemetry"))]
    let _ = config;
}
