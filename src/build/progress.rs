use std::sync::atomic::{AtomicUsize, Ordering};

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

const BAR_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} packages {msg}";

/// Progress tracker for displaying progress during parallel inspection
#[derive(Debug)]
pub struct ProgressTracker {
    /// Smallest number of items that gets a progress bar
    threshold: usize,
}

impl ProgressTracker {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    /// Run `operation` over `items` in parallel on the current rayon pool.
    ///
    /// Results keep the order of `items`; the first error stops the run.
    pub fn track_parallel<T, R, E, L, F>(&self, items: &[T], label: L, operation: F) -> Result<Vec<R>, E>
    where
        L: Fn(&T) -> String + Sync,
        T: Sync,
        R: Send,
        E: Send,
        F: Fn(&T) -> Result<R, E> + Sync + Send,
    {
        let progress_bar = (items.len() >= self.threshold).then(|| {
            let pb = ProgressBar::new(items.len() as u64);
            let style = ProgressStyle::default_bar()
                .template(BAR_TEMPLATE)
                .map(|style| style.progress_chars("#>-"))
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            pb.set_style(style);
            pb
        });

        let processed_count = AtomicUsize::new(0);

        let results = items
            .par_iter()
            .map(|item| {
                let result = operation(item);

                let current_count = processed_count.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some(pb) = &progress_bar {
                    pb.set_position(current_count as u64);
                    pb.set_message(label(item));
                }

                result
            })
            .collect::<Result<Vec<R>, E>>();

        if let Some(pb) = progress_bar {
            match &results {
                Ok(_) => pb.finish_with_message("done"),
                Err(_) => pb.abandon_with_message("failed"),
            }
        }

        results
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(10)
    }
}
