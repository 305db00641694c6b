use clap::Parser;
use gausshmm::{
    hmm::{
        FitConfig, GaussianEmission, HmmModel, HmmParams, InitialDistribution,
        TransitionModel,
    },
    linalg::NativeLinalg,
    prelude::Result,
    utils::{agreement, argmax_path, timer},
};
use log::info;
use ndarray::prelude::*;

///
/// Sample observations from a well-separated model, then fit a fresh
/// model to them and report the recovered parameters.
///
#[derive(Parser, Debug)]
#[clap(author, about)]
struct Opts {
    #[clap(short = 'n', default_value = "2")]
    n_states: usize,
    #[clap(short = 'd', default_value = "1")]
    dim: usize,
    #[clap(short = 'l', default_value = "500")]
    length: usize,
    /// distance between the means of neighboring states
    #[clap(long, default_value = "5.0")]
    separation: f64,
    #[clap(long, default_value = "100")]
    max_iter: usize,
    #[clap(long, default_value = "0")]
    seed: u64,
    #[clap(short = 'v', long)]
    verbose: bool,
}

fn true_model(opts: &Opts) -> Result<HmmModel<NativeLinalg>> {
    let n = opts.n_states;
    let stay = if n == 1 { 1.0 } else { 0.95 };
    let mut transition = Array2::from_elem((n, n), (1.0 - stay) / (n as f64 - 1.0).max(1.0));
    transition.diag_mut().fill(stay);
    let emissions = (0..n)
        .map(|i| {
            let mean = Array1::from_elem(opts.dim, i as f64 * opts.separation);
            GaussianEmission::with_identity(mean, &NativeLinalg)
        })
        .collect::<Result<Vec<_>>>()?;
    let params = HmmParams::new(
        TransitionModel::new(transition)?,
        InitialDistribution::uniform(n),
        emissions,
    )?;
    HmmModel::from_params(params, NativeLinalg)
}

fn main() -> Result<()> {
    env_logger::init();
    let opts: Opts = Opts::parse();
    println!("# started_at={}", chrono::Local::now());
    println!("# opts={:?}", opts);

    let truth = true_model(&opts)?;
    let sim = truth.simulate_seeded(opts.length, true, opts.seed)?;
    let observations = sim.observations.unwrap_or_default();
    info!("sampled {} observations", observations.len());

    let decoded = argmax_path(&truth.decode(&observations)?);
    println!(
        "# true model: decode agreement={}",
        agreement(&decoded, &sim.states)
    );

    let mut model = HmmModel::new(opts.n_states, opts.dim, NativeLinalg)?;
    let mut config = FitConfig::new(opts.max_iter);
    config.verbose = opts.verbose;
    let (report, t) = timer(|| model.fit_with(&observations, &config));
    let report = report?;
    println!(
        "# fit: iterations={} termination={:?} time={}ms",
        report.iterations, report.termination, t
    );
    if let Some(ll) = report.log_likelihoods.last() {
        println!("# fit: logProb={}", ll);
    }
    println!("{}", model);

    println!("# finished_at={}", chrono::Local::now());
    Ok(())
}
