use canvas_frameloop::FrameLoopConfig;
use canvas_frameloop::backend::headless::LogEngine;
use canvas_frameloop::runtime::HeadlessRuntime;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = FrameLoopConfig::default();
    let mut runtime = match HeadlessRuntime::bootstrap(cfg, |_| Ok(LogEngine::default())) {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("frameloop error: {err}");
            std::process::exit(1);
        }
    };
    runtime.run();
}
