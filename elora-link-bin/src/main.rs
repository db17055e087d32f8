use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{arg, value_parser, ArgMatches, Command};
use log::{debug, info, warn};
use uuid::Uuid;

use elora_link::inbound::{parse_inbounds, InboundConfig, InboundFileFormat};
use elora_link::share_link::{decode_share_link, encode_share_link};
use elora_link::subscription::{
    decode_b64_links, encode_b64_links, Subscription, SubscriptionUserInfo,
};

fn main() -> Result<()> {
    let args = get_args();
    init_log(&args);
    try_main(&args)
}

fn get_args() -> ArgMatches {
    clap::command!()
        .arg(
            arg!(-v --verbose "Turn on verbose logging")
                .required(false)
                .global(true),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("encode")
                .about("Generate a share link from inbound settings given on the command line")
                .arg(arg!(--address <ADDRESS> "Server address"))
                .arg(arg!(--port <PORT> "Server port").value_parser(value_parser!(u16)))
                .arg(arg!(--id <UUID> "Client UUID").value_parser(parse_uuid))
                .arg(arg!(--remark <REMARK> "Link name").required(false))
                .arg(
                    arg!(--security <MODE> "none, tls or reality")
                        .required(false)
                        .default_value("none"),
                )
                .arg(
                    arg!(--network <TYPE> "tcp, ws, grpc, httpupgrade or xhttp")
                        .required(false)
                        .default_value("ws"),
                )
                .arg(arg!(--host <HOST> "HTTP Host header").required(false))
                .arg(arg!(--sni <SNI> "TLS server name").required(false))
                .arg(arg!(--fp <FINGERPRINT> "TLS client fingerprint").required(false))
                .arg(
                    arg!(--path <PATH> "Transport path")
                        .required(false)
                        .default_value("/"),
                )
                .arg(arg!(--flow <FLOW> "VLESS flow").required(false))
                .arg(
                    arg!(--alpn <ALPN> "ALPN protocol, may be repeated")
                        .required(false)
                        .action(clap::ArgAction::Append),
                )
                .arg(arg!(--sid <SHORT_ID> "Reality short id").required(false))
                .arg(arg!(--pbk <PUBLIC_KEY> "Reality public key").required(false))
                .arg(arg!(--spx <SPIDER_X> "Reality spider path").required(false))
                .arg(arg!(--mode <MODE> "xhttp mode").required(false))
                .arg(arg!(--extra <EXTRA> "xhttp extra settings").required(false)),
        )
        .subcommand(
            Command::new("inbound")
                .about("Generate share links for a client from an inbound file (JSON or TOML)")
                .arg(arg!(<FILE> "Inbound file").value_parser(value_parser!(PathBuf)))
                .arg(arg!(--id <UUID> "Client UUID").value_parser(parse_uuid))
                .arg(arg!(--remark <REMARK> "Override the name of every link").required(false))
                .arg(arg!(--subscription "Print a Base64 subscription body instead").required(false))
                .arg(
                    arg!(--userinfo <HEADER> "Subscription-Userinfo header to print before the body, e.g. \"upload=0; download=0; total=1024\"")
                        .required(false),
                ),
        )
        .subcommand(
            Command::new("decode")
                .about("Print the parameters of a share link as JSON")
                .arg(arg!(<LINK> "Share link")),
        )
        .subcommand(
            Command::new("decode-subscription")
                .about("Print the proxies of a Base64 subscription body as JSON")
                .arg(arg!(<FILE> "Subscription body").value_parser(value_parser!(PathBuf))),
        )
        .get_matches()
}

fn parse_uuid(s: &str) -> Result<Uuid, String> {
    Uuid::parse_str(s).map_err(|e| e.to_string())
}

fn init_log(args: &ArgMatches) {
    let is_verbose = args.get_flag("verbose");
    let colors = fern::colors::ColoredLevelConfig::new();
    let default_level;
    #[cfg(debug_assertions)]
    {
        default_level = log::LevelFilter::Debug;
    }
    #[cfg(not(debug_assertions))]
    {
        default_level = log::LevelFilter::Info;
    }
    let level = if is_verbose {
        log::LevelFilter::Debug
    } else {
        default_level
    };

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S%.3f]"),
                record.target(),
                colors.color(record.level()),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
        .expect("Cannot set up logger");
}

fn try_main(args: &ArgMatches) -> Result<()> {
    match args.subcommand() {
        Some(("encode", sub)) => encode(sub),
        Some(("inbound", sub)) => inbound(sub),
        Some(("decode", sub)) => decode(sub),
        Some(("decode-subscription", sub)) => decode_subscription(sub),
        _ => unreachable!("subcommand is required"),
    }
}

fn get_str(args: &ArgMatches, id: &str) -> String {
    args.get_one::<String>(id).cloned().unwrap_or_default()
}

fn encode(args: &ArgMatches) -> Result<()> {
    let config = InboundConfig {
        remark: get_str(args, "remark"),
        address: get_str(args, "address"),
        port: *args.get_one::<u16>("port").context("Missing port")?,
        host: get_str(args, "host"),
        sni: get_str(args, "sni"),
        fingerprint: get_str(args, "fp"),
        path: get_str(args, "path"),
        security: get_str(args, "security"),
        short_id: get_str(args, "sid"),
        public_key: get_str(args, "pbk"),
        spider_x: get_str(args, "spx"),
        flow: get_str(args, "flow"),
        network: get_str(args, "network"),
        alpn: args
            .get_many::<String>("alpn")
            .map(|a| a.cloned().collect())
            .unwrap_or_default(),
        config_mode: get_str(args, "mode"),
        extra: get_str(args, "extra"),
    };
    let user_id = args.get_one::<Uuid>("id").context("Missing client UUID")?;
    let descriptor = config
        .to_descriptor(user_id, None)
        .context("Invalid inbound settings")?;
    println!("{}", encode_share_link(&descriptor));
    Ok(())
}

fn load_inbounds(path: &Path) -> Result<Vec<InboundConfig>> {
    let format = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(InboundFileFormat::from_extension)
        .with_context(|| {
            format!(
                "Cannot tell the format of {}, expecting .json or .toml",
                path.display()
            )
        })?;
    info!("Loading inbounds from {}", path.display());
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_inbounds(&text, format).with_context(|| format!("Failed to parse {}", path.display()))
}

fn inbound(args: &ArgMatches) -> Result<()> {
    let path = args.get_one::<PathBuf>("FILE").context("Missing inbound file")?;
    let user_id = args.get_one::<Uuid>("id").context("Missing client UUID")?;
    let remark = args.get_one::<String>("remark").map(|s| s.as_str());

    let inbounds = load_inbounds(path)?;
    let mut links = Vec::with_capacity(inbounds.len());
    for inbound in &inbounds {
        match inbound.to_descriptor(user_id, remark) {
            Ok(descriptor) => links.push(encode_share_link(&descriptor)),
            Err(e) => warn!("Skipping inbound: {}", e),
        }
    }
    debug!("{} of {} inbounds encoded", links.len(), inbounds.len());
    if links.is_empty() {
        anyhow::bail!("No usable inbound in {}", path.display());
    }

    if args.get_flag("subscription") {
        if let Some(header) = args.get_one::<String>("userinfo") {
            let userinfo = SubscriptionUserInfo::decode_header(header);
            println!("Subscription-Userinfo: {}", userinfo.encode_header());
        }
        println!("{}", encode_b64_links(&links));
    } else {
        for link in &links {
            println!("{}", link);
        }
    }
    Ok(())
}

fn decode(args: &ArgMatches) -> Result<()> {
    let link = args.get_one::<String>("LINK").context("Missing share link")?;
    let descriptor = decode_share_link(link).context("Failed to decode share link")?;
    let json = serde_json::to_string_pretty(&descriptor).context("Failed to serialize JSON")?;
    println!("{}", json);
    Ok(())
}

fn decode_subscription(args: &ArgMatches) -> Result<()> {
    let path = args
        .get_one::<PathBuf>("FILE")
        .context("Missing subscription file")?;
    let data = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let subscription = decode_b64_links(&data)
        .and_then(Subscription::ensure_proxies)
        .with_context(|| format!("Failed to decode subscription {}", path.display()))?;
    info!("{} proxies decoded", subscription.proxies.len());
    let json = serde_json::to_string_pretty(&subscription).context("Failed to serialize JSON")?;
    println!("{}", json);
    Ok(())
}
