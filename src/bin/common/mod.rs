use std::{
    error, fs,
    io::{self, Read},
    path::Path,
};

/// Reads the save at `path`, which must carry the `.sav` extension, or
/// all of stdin when there is no path.
pub fn read_input(path: Option<&str>) -> Result<Vec<u8>, Box<dyn error::Error>> {
    let Some(path) = path else {
        let mut data = Vec::new();
        io::stdin().lock().read_to_end(&mut data)?;
        return Ok(data);
    };

    if !is_save_path(path) {
        return Err(format!("{} is not a .sav file", path).into());
    }

    Ok(fs::read(path)?)
}

fn is_save_path(path: &str) -> bool {
    Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("sav"))
}
