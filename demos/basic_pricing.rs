//! Example: Black-Scholes pricing, Greeks and implied volatility
//!
//! Run with: cargo run --example basic_pricing
//! Solver diagnostics: RUST_LOG=iv_greeks=trace cargo run --example basic_pricing

use iv_greeks::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), IVError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Option parameters
    let spot = 3500.0;
    let strike = 3550.0;
    let time = 30.0 / 365.0; // 30 days
    let rate = 0.068;
    let div = 0.0;
    let vol = 0.20;

    println!("=== Black-Scholes Pricing ===\n");
    println!("Spot:     {:.2}", spot);
    println!("Strike:   {:.2}", strike);
    println!("Time:     {:.4} years ({:.0} days)", time, time * 365.0);
    println!("Rate:     {:.1}%", rate * 100.0);
    println!("Div:      {:.1}%", div * 100.0);
    println!("Vol:      {:.1}%\n", vol * 100.0);

    // Market price is irrelevant for pricing; it is replaced below
    let call = OptionQuote::new(spot, strike, 1.0, time, rate, div, OptionType::Call)?;
    let put = OptionQuote::new(spot, strike, 1.0, time, rate, div, OptionType::Put)?;

    let call_price = bs_price(&call, vol)?;
    let put_price = bs_price(&put, vol)?;
    println!("Call Price: {:.4}", call_price);
    println!("Put Price:  {:.4}", put_price);

    // Verify put-call parity: C - P = S*e^(-qT) - K*e^(-rT)
    let parity_lhs = call_price - put_price;
    let parity_rhs = spot * (-div * time).exp() - strike * (-rate * time).exp();
    println!("\nPut-Call Parity Check:");
    println!("  C - P = {:.4}", parity_lhs);
    println!("  S*e^(-qT) - K*e^(-rT) = {:.4}", parity_rhs);
    println!("  Difference: {:.2e}", (parity_lhs - parity_rhs).abs());

    println!("\n=== Greeks (Call) ===\n");
    let greeks = bs_greeks(&call, vol)?;
    let desk = greeks.report(&ReportingConvention::default());
    println!("Delta:  {:.4}", greeks.delta);
    println!("Gamma:  {:.6}", greeks.gamma);
    println!("Vega:   {:.4} (per 1%: {:.4})", greeks.vega, desk.vega);
    println!("Theta:  {:.4} (per day: {:.4})", greeks.theta, desk.theta);
    println!("Rho:    {:.4} (per 1%: {:.4})", greeks.rho, desk.rho);

    println!("\n=== Implied Volatility ===\n");
    let config = SolverConfig::default();
    for bump in [0.0, 5.0, 25.0, 500.0] {
        let quote = call.with_market_price(call_price + bump)?;
        match implied_volatility(&quote, &config) {
            Ok(sol) => println!(
                "Market {:>9.4} -> IV {:.4}% ({} iterations, {} Newton, residual {:.1e})",
                quote.market_price(),
                sol.sigma * 100.0,
                sol.iterations,
                sol.newton_steps,
                sol.residual
            ),
            Err(e) => println!("Market {:>9.4} -> {}", quote.market_price(), e),
        }
    }

    Ok(())
}
