use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path, Settings};

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();

    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    } else if settings.data_dir == Settings::default().data_dir {
        // First run — prompt for data dir
        println!("Data directory [{}]: ", settings.data_dir);
        let mut input = String::new();
        std::io::stdin().read_line(&mut input).ok();
        let chosen = input.trim();
        if !chosen.is_empty() {
            settings.data_dir = shellexpand_path(chosen);
        }
    }

    save_settings(&settings)?;

    let data_dir = settings.data_dir();
    std::fs::create_dir_all(&data_dir)?;
    std::fs::create_dir_all(settings.raw_data_dir())?;

    println!("Initialized kasboek at {}", data_dir.display());
    println!(
        "Drop bank export CSVs in {} and run `kasboek review`.",
        settings.raw_data_dir().display()
    );
    Ok(())
}
