use clap::Parser;
use radius_engine::{Config, Dispatcher, Flow, RadiusServer, Session, SessionSet};
use radius_wire::{AcctStatusType, AttributeType, Code, Packet, VendorDictionary};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::process;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// RADIUS Engine - RFC 2865/2866 authentication and accounting server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "radius-engine")]
struct Cli {
    /// Path to configuration file
    #[arg(value_name = "CONFIG", default_value = "config.json")]
    config_path: String,

    /// Validate configuration and exit (doesn't start server)
    #[arg(short, long)]
    validate: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::from_file(&cli.config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing_subscriber::registry()
                .with(EnvFilter::new("info"))
                .with(tracing_subscriber::fmt::layer())
                .init();

            if cli.validate {
                error!("configuration validation failed: {}", e);
                process::exit(1);
            }

            warn!("could not load config file from: {}", cli.config_path);
            info!("creating example configuration at: {}", cli.config_path);

            if let Err(e) = Config::example().to_file(&cli.config_path) {
                error!("error creating example config: {}", e);
                process::exit(1);
            }

            info!("please edit {} and restart the server", cli.config_path);
            process::exit(0);
        }
    };

    if cli.validate {
        println!("configuration validated successfully");
        println!("  listen: {}:{}", config.listen_address, config.listen_port);
        println!("  users: {}", config.users.len());
        println!(
            "  vendor dictionary: {}",
            config
                .vendor_dictionary
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "none".to_string())
        );
        process::exit(0);
    }

    let log_level = config.log_level.clone().unwrap_or_else(|| "info".to_string());
    tracing_subscriber::registry()
        .with(EnvFilter::new(log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let vendors = Arc::new(VendorDictionary::new());
    if let Some(path) = &config.vendor_dictionary {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                error!("cannot open vendor dictionary {}: {}", path.display(), e);
                process::exit(1);
            }
        };
        if let Err(e) = vendors.load(BufReader::new(file)) {
            error!("cannot load vendor dictionary {}: {}", path.display(), e);
            process::exit(1);
        }
        info!(
            "loaded {} vendor attributes from {}",
            vendors.len(),
            path.display()
        );
    }

    let bind_addr = match config.socket_addr() {
        Ok(addr) => addr,
        Err(e) => {
            error!("invalid listen address: {}", e);
            process::exit(1);
        }
    };

    let dispatcher = build_dispatcher(&config, Arc::clone(&vendors));

    let server = match RadiusServer::bind(bind_addr, config.secret.as_bytes(), dispatcher).await {
        Ok(server) => server,
        Err(e) => {
            error!("failed to bind {}: {}", bind_addr, e);
            process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        error!("server terminated: {}", e);
        process::exit(1);
    }
}

/// Wire the policy chains: PAP authentication for Access-Request, session
/// bookkeeping for Accounting-Request, liveness answers for Status-Server.
fn build_dispatcher(config: &Config, vendors: Arc<VendorDictionary>) -> Dispatcher {
    let users: Arc<HashMap<String, String>> = Arc::new(
        config
            .users
            .iter()
            .map(|u| (u.username.clone(), u.password.clone()))
            .collect(),
    );
    let sessions = Arc::new(SessionSet::new());

    let mut dispatcher = Dispatcher::new();

    // Trace vendor attributes under their dictionary names before any
    // decision is made.
    dispatcher.route(Code::AccessRequest, move |req: &Packet, _: &mut Packet| {
        for attr in &req.attributes {
            if let Some(vsa) = attr.vendor {
                let name = vendors
                    .attribute_name(vsa.vendor_id, vsa.vendor_type)
                    .unwrap_or_else(|| format!("Vendor-{}/{}", vsa.vendor_id, vsa.vendor_type));
                debug!(attribute = %name, value = ?attr.value, "vendor attribute");
            }
        }
        Flow::Continue
    });

    dispatcher.route(Code::AccessRequest, move |req: &Packet, res: &mut Packet| {
        let username = req.first_attribute_string("User-Name", None);
        let password = req.first_attribute_string("User-Password", None);

        let authenticated = match (&username, &password) {
            (Some(user), Some(pass)) => users.get(user).map(|p| p == pass).unwrap_or(false),
            _ => false,
        };

        if authenticated {
            info!(
                username = username.as_deref().unwrap_or("?"),
                request_id = req.identifier,
                "authentication successful"
            );
            res.code = Code::AccessAccept;
        } else {
            warn!(
                username = username.as_deref().unwrap_or("?"),
                request_id = req.identifier,
                "authentication failed"
            );
            res.code = Code::AccessReject;
            res.add_attribute_by_name("Reply-Message", b"Authentication failed".to_vec())
                .ok();
        }
        Flow::Continue
    });

    dispatcher.route(Code::AccountingRequest, move |req: &Packet, res: &mut Packet| {
        res.code = Code::AccountingResponse;

        let status = req
            .find_attribute(AttributeType::AcctStatusType.as_u8())
            .and_then(|attr| attr.as_integer().ok())
            .and_then(AcctStatusType::from_u32);
        let session_id = req.first_attribute_string("Acct-Session-Id", None);

        match (status, session_id) {
            (Some(AcctStatusType::Start), Some(id)) => {
                let session = Session::new(
                    req.first_attribute_string("User-Name", None),
                    req.first_attribute_string("NAS-Identifier", None),
                );
                info!(session_id = %id, "accounting session started");
                sessions.start(id, session);
            }
            (Some(AcctStatusType::Stop), Some(id)) => {
                info!(session_id = %id, "accounting session stopped");
                sessions.stop(&id);
            }
            (Some(status), _) => {
                debug!(status = status.as_u32(), "accounting status acknowledged");
            }
            (None, _) => {
                warn!(request_id = req.identifier, "accounting request without status type");
            }
        }
        Flow::Continue
    });

    dispatcher.route(Code::StatusServer, |_: &Packet, res: &mut Packet| {
        res.code = Code::AccessAccept;
        Flow::Continue
    });

    dispatcher.on_drop(|req, _| {
        warn!(
            packet_type = %req.code,
            request_id = req.identifier,
            "request dropped by policy"
        );
    });

    dispatcher
}
