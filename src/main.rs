#![allow(non_snake_case)]
use RustedLinkage::Examples::linkage_examples::linkage_examples;
use RustedLinkage::Utils::logger::init_logger;
use RustedLinkage::Utils::task_config::LinkageTask;
use log::error;

fn main() {
    // a TOML task passed as the first argument is run instead of the built-in examples
    if let Some(path) = std::env::args().nth(1) {
        match LinkageTask::from_file(&path).and_then(|task| task.run()) {
            Ok(_) => {}
            Err(e) => {
                let _ = init_logger("error", false);
                error!("task {} failed: {}", path, e);
                std::process::exit(1);
            }
        }
        return;
    }
    let _ = init_logger("info", false);
    let example = 0;
    if let Err(e) = linkage_examples(example) {
        error!("example {} failed: {}", example, e);
    }
}
