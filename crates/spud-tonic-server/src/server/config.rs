use anyhow::{Context, bail};
use clap::{ArgAction, Parser};
use std::net::{Ipv4Addr, SocketAddr};
use tonic::transport::Uri;

/// Runtime configuration for the `spud-server` binary.
///
/// All values are parsed from CLI arguments or environment variables (a
/// `.env` file is loaded first), with defaults suitable for running the gRPC
/// server and its HTTP gateway side by side on one host.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "spud-server",
    version,
    about = "A gRPC potato catalog with an HTTP/JSON gateway"
)]
pub struct CliArgs {
    /// Port the HTTP/JSON gateway listens on (all interfaces).
    ///
    /// Environment variable: `LISTEN_PORT`
    #[arg(long, env = "LISTEN_PORT", default_value_t = 8081)]
    pub listen_port: u16,

    /// Address the gRPC server listens on.
    ///
    /// Environment variable: `GRPC_ADDR`
    #[arg(long, env = "GRPC_ADDR", default_value_t = String::from("0.0.0.0:8080"))]
    pub grpc_addr: String,

    /// gRPC endpoint of the potato service the gateway forwards to.
    ///
    /// An `http://` scheme is assumed when none is given.
    ///
    /// Environment variable: `POTATO_ENDPOINT`
    #[arg(long, env = "POTATO_ENDPOINT", default_value_t = String::from("localhost:8080"))]
    pub potato_endpoint: String,

    /// Enable DEBUG level logs. `RUST_LOG` takes precedence when set.
    ///
    /// Environment variable: `DEBUG`
    #[arg(long, env = "DEBUG", default_value_t = true, action = ArgAction::Set)]
    pub debug: bool,

    /// Pretty-print logs for humans instead of emitting JSON lines.
    ///
    /// Environment variable: `DEV_MODE`
    #[arg(long, env = "DEV_MODE", default_value_t = true, action = ArgAction::Set)]
    pub dev_mode: bool,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub http_addr: SocketAddr,
    pub grpc_addr: SocketAddr,
    pub potato_endpoint: Uri,
    pub debug: bool,
    pub dev_mode: bool,
}

impl ServerConfig {
    /// Human readable list of the downstream gRPC endpoints, for startup logs.
    pub fn endpoints(&self) -> String {
        format!("Endpoints:\n  * potato-service: {}\n", self.potato_endpoint)
    }
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.listen_port == 0 {
            bail!("LISTEN_PORT must be greater than 0");
        }

        let grpc_addr: SocketAddr = args
            .grpc_addr
            .parse()
            .with_context(|| format!("GRPC_ADDR `{}` is not a socket address", args.grpc_addr))?;

        let http_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, args.listen_port));
        if http_addr == grpc_addr {
            bail!("LISTEN_PORT and GRPC_ADDR must not point at the same address ({http_addr})");
        }

        let endpoint = if args.potato_endpoint.contains("://") {
            args.potato_endpoint
        } else {
            format!("http://{}", args.potato_endpoint)
        };
        let potato_endpoint: Uri = endpoint
            .parse()
            .with_context(|| format!("POTATO_ENDPOINT `{endpoint}` is not a valid URI"))?;
        if potato_endpoint.host().is_none() {
            bail!("POTATO_ENDPOINT `{endpoint}` has no host");
        }

        Ok(Self {
            http_addr,
            grpc_addr,
            potato_endpoint,
            debug: args.debug,
            dev_mode: args.dev_mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    // Every flag is passed explicitly so ambient environment variables such
    // as `DEBUG` cannot leak into the parsed values.
    const BASELINE: [(&str, &str); 5] = [
        ("--listen-port", "8081"),
        ("--grpc-addr", "0.0.0.0:8080"),
        ("--potato-endpoint", "localhost:8080"),
        ("--debug", "true"),
        ("--dev-mode", "true"),
    ];

    fn parse(overrides: &[(&str, &str)]) -> anyhow::Result<ServerConfig> {
        let mut argv = vec!["spud-server"];
        for (flag, baseline) in BASELINE {
            let value = overrides
                .iter()
                .find(|(f, _)| *f == flag)
                .map_or(baseline, |(_, v)| *v);
            argv.extend([flag, value]);
        }
        let args = CliArgs::try_parse_from(argv)?;
        ServerConfig::try_from(args)
    }

    fn env_and_default(id: &str) -> (String, String) {
        let command = CliArgs::command();
        let arg = command
            .get_arguments()
            .find(|arg| arg.get_id() == id)
            .unwrap();
        let env = arg.get_env().unwrap().to_string_lossy().into_owned();
        let default = arg.get_default_values()[0].to_string_lossy().into_owned();
        (env, default)
    }

    #[test]
    fn declared_env_vars_and_defaults() {
        let expected = [
            ("listen_port", "LISTEN_PORT", "8081"),
            ("grpc_addr", "GRPC_ADDR", "0.0.0.0:8080"),
            ("potato_endpoint", "POTATO_ENDPOINT", "localhost:8080"),
            ("debug", "DEBUG", "true"),
            ("dev_mode", "DEV_MODE", "true"),
        ];
        for (id, env, default) in expected {
            assert_eq!(
                env_and_default(id),
                (env.to_string(), default.to_string()),
                "{id}"
            );
        }
        // The baseline above mirrors the declared defaults.
        for ((_, value), (_, _, default)) in BASELINE.iter().zip(expected) {
            assert_eq!(*value, default);
        }
    }

    #[test]
    fn default_values_build_config() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.http_addr, "0.0.0.0:8081".parse::<SocketAddr>().unwrap());
        assert_eq!(config.grpc_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.potato_endpoint.scheme_str(), Some("http"));
        assert_eq!(config.potato_endpoint.host(), Some("localhost"));
        assert_eq!(config.potato_endpoint.port_u16(), Some(8080));
        assert!(config.debug);
        assert!(config.dev_mode);
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse(&[
            ("--listen-port", "9000"),
            ("--grpc-addr", "127.0.0.1:9001"),
            ("--potato-endpoint", "https://potatoes.internal:443"),
            ("--debug", "false"),
            ("--dev-mode", "false"),
        ])
        .unwrap();
        assert_eq!(config.http_addr.port(), 9000);
        assert_eq!(config.grpc_addr.port(), 9001);
        assert_eq!(config.potato_endpoint.scheme_str(), Some("https"));
        assert!(!config.debug);
        assert!(!config.dev_mode);
        assert!(config.endpoints().contains("potatoes.internal"));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(parse(&[("--listen-port", "0")]).is_err());
        assert!(parse(&[("--grpc-addr", "not-an-addr")]).is_err());
        assert!(parse(&[("--potato-endpoint", "http://")]).is_err());
        assert!(parse(&[("--listen-port", "8080"), ("--grpc-addr", "0.0.0.0:8080")]).is_err());
        assert!(parse(&[("--debug", "1")]).is_err());
    }
}
