use anyhow::{Context, bail};
use clap::Parser;

use apigw_authorizer::config::DEFAULT_ISSUER;
use apigw_authorizer::services::auth::{TokenIssuer, VerificationSecret};
use apigw_authorizer::services::clock;

/// Mint an HS256 test token accepted by the authorizer.
///
/// Prints:
/// - the claim set as JSON
/// - the encoded token
/// - a curl command against the deployed gateway stage
#[derive(Parser, Debug)]
#[command(name = "token-gen", version, about)]
struct Args {
    /// Shared HMAC secret (same value the authorizer reads from SECRET)
    #[arg(long, env = "SECRET", hide_env_values = true)]
    secret: String,

    /// Issuer claim (iss)
    #[arg(long, env = "AUTHZ_ISS", default_value = DEFAULT_ISSUER)]
    issuer: String,

    /// Subject claim (sub)
    #[arg(long, default_value = "3f94876234f876hb8")]
    sub: String,

    /// Token lifetime in seconds (exp = now + ttl)
    #[arg(long, default_value_t = 60)]
    ttl: u64,

    /// Override jti. Default: random UUID v4.
    #[arg(long)]
    jti: Option<String>,

    /// Override now (unix seconds), used for nbf/iat. Default: current time.
    #[arg(long)]
    now: Option<i64>,

    /// API Gateway id used in the example curl command
    #[arg(long, env = "AWS_APIGW_ID", default_value = "unknown")]
    api_id: String,

    /// AWS region used in the example curl command
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    region: String,

    /// Print only the token (no extra lines)
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    if args.secret.is_empty() {
        bail!("SECRET must not be empty");
    }

    let issuer = TokenIssuer::new(&VerificationSecret::new(&args.secret), args.issuer, args.ttl);
    let now = args.now.unwrap_or_else(clock::unix_now);
    let minted = match args.jti.as_deref() {
        Some(jti) => issuer.mint_with_jti(&args.sub, jti, now),
        None => issuer.mint(&args.sub, now),
    }
    .context("failed to mint token")?;

    if args.quiet {
        println!("{}", minted.token);
        return Ok(());
    }

    let payload = serde_json::to_string_pretty(&minted.claims)?;
    println!("Payload in JSON:\n---------------\n{payload}\n---------------\n");
    println!("encoded_jwt={}\n", minted.token);
    println!(
        "curl test command:\n----------------------------------------\n\n\
         curl -vvv -X GET -H \"Authorization: {}\"  https://{}.execute-api.{}.amazonaws.com/dev/echo-test\n\n\
         ----------------------------------------\n",
        minted.token, args.api_id, args.region
    );

    Ok(())
}
