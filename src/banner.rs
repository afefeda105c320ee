// src/banner.rs

/// Prints the application startup banner to the console.
pub fn print_banner() {
    let banner = r#"
                 _    _
 _ __ ___  _   _| | _| | ___   _
| '_ ` _ \| | | | |/ / |/ / | | |
| | | | | | |_| |   <|   <| |_| |
|_| |_| |_|\__,_|_|\_\_|\_\\__,_|

    Mukku Compiler Backend
"#;
    println!("{}", banner);
}
