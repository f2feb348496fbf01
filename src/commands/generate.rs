//! Generate static files

use anyhow::Result;

use crate::generator::Generator;
use crate::Blog;

/// Load the published collection and render the static site
pub fn run(blog: &Blog) -> Result<()> {
    let start = std::time::Instant::now();

    let posts = blog.load_published()?;
    let generator = Generator::new(blog)?;
    let written = generator.generate(&posts)?;

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} files in {:.2}s",
        written.len(),
        duration.as_secs_f64()
    );

    Ok(())
}
