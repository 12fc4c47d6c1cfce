//! リダイレクトを追跡して URL を取得する例
//!
//! 使い方:
//!   cargo run -p http11_fetch -- http://example.com/
//!   cargo run -p http11_fetch -- --debug --max-hops 3 http://httpbin.org/redirect/2
//!   cargo run -p http11_fetch -- --head https://example.com/
//!   cargo run -p http11_fetch -- --proxy http://127.0.0.1:3128 --proxy-user u --proxy-password p http://example.com/

use hopchain::{HeaderBlock, Method, RequestBody};
use hopchain_client::{Error, ProxyConfig, RedirectingClient, TransportConfig};
use log::LevelFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = noargs::raw_args();
    args.metadata_mut().app_name = "http11_fetch";

    // --help フラグ
    noargs::HELP_FLAG.take_help(&mut args);

    // --version フラグ
    let version_flag: bool = noargs::flag("version")
        .short('V')
        .doc("Show version")
        .take(&mut args)
        .is_present();
    if version_flag {
        println!("{}", env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    let debug: bool = noargs::flag("debug")
        .short('d')
        .doc("Enable debug logging")
        .take(&mut args)
        .is_present();

    let no_follow: bool = noargs::flag("no-follow")
        .doc("Do not follow redirects")
        .take(&mut args)
        .is_present();

    let head: bool = noargs::flag("head")
        .short('I')
        .doc("Send HEAD and print only the header chain")
        .take(&mut args)
        .is_present();

    let max_hops: usize = noargs::opt("max-hops")
        .doc("Maximum number of exchanges per request (default: 10)")
        .default("10")
        .take(&mut args)
        .then(|o| o.value().parse())
        .map_err(|e| format!("{:?}", e))?;

    let proxy: Option<String> = noargs::opt("proxy")
        .doc("HTTP proxy URI (e.g., http://127.0.0.1:3128)")
        .take(&mut args)
        .present_and_then(|o| Ok::<_, &str>(o.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;

    let proxy_user: Option<String> = noargs::opt("proxy-user")
        .doc("Proxy user name")
        .take(&mut args)
        .present_and_then(|o| Ok::<_, &str>(o.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;

    let proxy_password: Option<String> = noargs::opt("proxy-password")
        .doc("Proxy password")
        .take(&mut args)
        .present_and_then(|o| Ok::<_, &str>(o.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;

    // 位置引数: URL
    let url: String = noargs::arg("<URL>")
        .doc("URL to fetch (e.g., https://example.com/)")
        .take(&mut args)
        .then(|a| Ok::<_, &str>(a.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;

    // 未知の引数があればエラー、ヘルプが返されたら表示
    if let Some(help) = args.finish().map_err(|e| format!("{:?}", e))? {
        print!("{}", help);
        return Ok(());
    }

    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let mut config = TransportConfig::new();
    if let Some(uri) = proxy {
        let mut proxy = ProxyConfig::new(&uri);
        if let Some(user) = proxy_user {
            proxy = proxy.credentials(&user, proxy_password.as_deref().unwrap_or(""));
        }
        config = config.proxy(proxy);
    }

    let mut client = RedirectingClient::with_config(&url, config)?
        .follow_redirects(!no_follow)
        .max_hops(max_hops);

    let method = if head { Method::Head } else { Method::Get };
    let headers = HeaderBlock::new().with("Accept", "*/*");
    let result = client.request_document(method, &RequestBody::Empty, Some(&headers));

    match result {
        Ok(document) => {
            print_chain(document.headers());
            if !head {
                println!();
                print!("{}", document.body());
            }
            if !document.ok() {
                std::process::exit(1);
            }
        }
        Err(Error::TooManyRedirects { limit }) => {
            if let Some(chain) = client.headers() {
                print_chain(chain);
            }
            eprintln!("Gave up after {} exchanges", limit);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Request failed: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_chain(chain: &HeaderBlock) {
    for (i, hop) in chain.hops().iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("# hop {}", i + 1);
        print!("{}", hop.to_text(false));
    }
}
