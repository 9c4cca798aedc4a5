//! Prints summaries of a save.
//!
//! Usage: `inspect <command> [save.sav]` where command is one of `info`,
//! `kills`, `scenes`, `items`, `currency`, `construction`, `face` or
//! `export`. The save is read from stdin when no path is given.

mod common;

use common::read_input;
use raidsave::{json::JsonOptions, Archive, ArchiveDecoder, EntryTable, GraphDecoder};
use std::{
    env, error,
    io::{self, BufWriter, Write},
};

const USAGE: &str =
    "usage: inspect <info|kills|scenes|items|currency|construction|face|export> [save.sav]";

fn info<W: Write>(out: &mut W, table: &EntryTable, archive: &Archive) -> io::Result<()> {
    writeln!(out, "format:   {}", table.format().name())?;
    writeln!(out, "entries:  {}", table.len())?;
    writeln!(out, "version:  {}", archive.version)?;
    writeln!(out, "level:    {}", archive.level)?;
    writeln!(out, "exp:      {}", archive.exp)?;
    writeln!(out, "health:   {}", archive.health)?;
    writeln!(out, "days:     {}", archive.game_clock.days)?;
    writeln!(out, "saved at: {}", archive.save_time)?;
    writeln!(out, "deaths:   {}", archive.death_list.len())?;
    writeln!(
        out,
        "quests:   {} active, {} done",
        archive.quests.active_quests.len(),
        archive.quests.history_quests.len()
    )?;

    let mut de = GraphDecoder::new();
    let typed = table
        .sections(&mut de)
        .iter()
        .filter(|(_, section)| section.tag().is_some())
        .count();
    writeln!(out, "sections: {} typed, {} other", typed, table.len() - typed)
}

fn kills<W: Write>(out: &mut W, archive: &Archive) -> io::Result<()> {
    let mut kills: Vec<_> = archive.kills.iter().collect();
    kills.sort_by(|a, b| b.count.cmp(&a.count));
    for kill in kills {
        writeln!(out, "{:>6}  {}", kill.count, kill.master_name)?;
    }
    Ok(())
}

fn items<W: Write>(out: &mut W, archive: &Archive) -> Result<(), Box<dyn error::Error>> {
    let mut entries = Vec::new();
    archive
        .character_item_data
        .walk(|entry, depth| entries.push((entry, depth)));

    for (entry, depth) in entries {
        let indent = depth * 2;
        writeln!(out, "{:indent$}#{} type {}", "", entry.instance_id, entry.type_id)?;
        for variable in &entry.variables {
            let value = serde_json::to_string(&variable.value())?;
            writeln!(out, "{:indent$}  {} = {}", "", variable.key, value)?;
        }
    }
    Ok(())
}

fn face<W: Write>(out: &mut W, table: &EntryTable) -> io::Result<()> {
    let mut de = GraphDecoder::new();
    let Some(face) = table.custom_face(&mut de) else {
        return writeln!(out, "no face settings");
    };

    for field in de.skipped() {
        log::warn!("defaulted {}", field);
    }

    let color = face.head_setting.main_color;
    writeln!(out, "head color: rgb({:.2}, {:.2}, {:.2})", color.r, color.g, color.b)?;
    let parts = [
        ("hair", face.hair_id),
        ("eyes", face.eye_id),
        ("eyebrows", face.eyebrow_id),
        ("mouth", face.mouth_id),
        ("tail", face.tail_id),
        ("feet", face.foot_id),
        ("wings", face.wing_id),
    ];
    for (part, id) in parts {
        writeln!(out, "{:<10} {}", part, id)?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let command = args.first().ok_or(USAGE)?;
    let data = read_input(args.get(1).map(String::as_str))?;

    let decoder = ArchiveDecoder::new();
    let table = EntryTable::from_slice_with(&data, decoder.options())?;

    let stdout = io::stdout().lock();
    let mut out = BufWriter::new(stdout);
    match command.as_str() {
        "info" => {
            let decoded = decoder.assemble(&table)?;
            info(&mut out, &table, decoded.archive())?;
        }
        "kills" => kills(&mut out, decoder.assemble(&table)?.archive())?,
        "items" => items(&mut out, decoder.assemble(&table)?.archive())?,
        "currency" => {
            let decoded = decoder.assemble(&table)?;
            let economy = &decoded.archive().economy_data;
            writeln!(out, "money:    {}", economy.money)?;
            writeln!(out, "unlocked: {}", economy.unlocked_items.len())?;
            writeln!(out, "pending:  {}", economy.unlockes_waiting_for_confirm.len())?;
        }
        "scenes" => {
            for scene in table.visited_scenes() {
                writeln!(out, "{}", scene)?;
            }
        }
        "construction" => {
            for (site, built) in table.construction_sites() {
                let status = if built { "built" } else { "not built" };
                writeln!(out, "{:<32} {}", site, status)?;
            }
        }
        "face" => face(&mut out, &table)?,
        "export" => {
            table
                .json()
                .with_options(JsonOptions::new().with_prettyprint(true))
                .to_writer(&mut out)?;
            writeln!(out)?;
        }
        _ => return Err(USAGE.into()),
    }

    out.flush()?;
    Ok(())
}
