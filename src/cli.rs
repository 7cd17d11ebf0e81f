use clap::Parser;
use std::path::PathBuf;

use crate::config::DEFAULT_SETTINGS_FILE;

#[derive(Parser, Debug, Default)]
#[command(
    name = "aividgen",
    version,
    about = "Generate narration text, voice-over audio and images for a short video using AI"
)]
pub struct Cli {
    #[arg(short, long, value_name = "PATH", help = "Path to the text file (txt) for voice conversion")]
    pub text_file: Option<PathBuf>,

    #[arg(short, long, value_name = "PATH", help = "Path to the background music file (mp3)")]
    pub music_file: Option<PathBuf>,

    #[arg(short, long, help = "Number of images to be generated")]
    pub num_images: Option<usize>,

    #[arg(short, long, value_name = "DIR", help = "Path for the folder where images will be saved")]
    pub image_output_folder: Option<PathBuf>,

    #[arg(short, long, value_name = "PATH", help = "Path for the output video file")]
    pub output_file: Option<PathBuf>,

    #[arg(
        short,
        long,
        value_name = "PATH",
        default_value = DEFAULT_SETTINGS_FILE,
        help = "Path to the settings JSON file"
    )]
    pub settings: PathBuf,

    #[arg(short, long, help = "Answer yes to every confirmation prompt")]
    pub yes: bool,

    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_flags_are_parsed() {
        let cli = Cli::try_parse_from([
            "aividgen", "-t", "story.txt", "-m", "calm.mp3", "-n", "7", "-i", "frames", "-o", "out.mp4",
        ])
        .unwrap();

        assert_eq!(cli.text_file, Some(PathBuf::from("story.txt")));
        assert_eq!(cli.music_file, Some(PathBuf::from("calm.mp3")));
        assert_eq!(cli.num_images, Some(7));
        assert_eq!(cli.image_output_folder, Some(PathBuf::from("frames")));
        assert_eq!(cli.output_file, Some(PathBuf::from("out.mp4")));
        assert_eq!(cli.settings, PathBuf::from("settings.json"));
        assert!(!cli.yes);
    }

    #[test]
    fn omitted_flags_stay_unset() {
        let cli = Cli::try_parse_from(["aividgen", "--yes"]).unwrap();
        assert!(cli.text_file.is_none());
        assert!(cli.num_images.is_none());
        assert!(cli.yes);
    }

    #[test]
    fn non_numeric_image_count_is_rejected() {
        assert!(Cli::try_parse_from(["aividgen", "-n", "many"]).is_err());
    }
}
