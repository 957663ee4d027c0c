use std::error::Error;
use lineplot as plt;

fn main() -> Result<(), Box<dyn Error>> {
    // Example data (replace with your own x and y values).
    let series = plt::Series::new(vec![1., 2., 3., 4., 5.],
                                  vec![2., 4., 6., 8., 10.])?;

    let (_fig, mut ax) = plt::figure()?;
    ax.line(&series).plot()?;
    ax.set_xlabel("X-axis")
        .set_ylabel("Y-axis")
        .set_title("Line Plot");

    // Blocks until the window is closed (interactive backends only).
    plt::show()?;
    Ok(())
}
