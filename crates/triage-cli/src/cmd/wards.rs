use crate::output::{print_json, print_table};
use triage_core::types::Language;
use triage_core::ward::{BedState, WardBoard};

pub fn run(beds: bool, lang: &str, json: bool) -> anyhow::Result<()> {
    let lang: Language = lang.parse()?;
    let board = WardBoard::default();

    if json {
        print_json(&serde_json::json!({
            "wards": board.wards(),
            "totals": board.totals(),
        }))?;
        return Ok(());
    }

    let rows = board
        .wards()
        .iter()
        .map(|w| {
            let mut row = vec![
                w.display_name(lang).to_string(),
                w.total.to_string(),
                w.occupied.to_string(),
                w.reserved.to_string(),
                w.available.to_string(),
                w.availability().label(lang).to_string(),
            ];
            if beds {
                row.push(icons(&w.bed_icons()));
            }
            row
        })
        .collect();

    let mut headers = vec!["WARD", "TOTAL", "OCCUPIED", "RESERVED", "FREE", "STATUS"];
    if beds {
        headers.push("BEDS");
    }
    print_table(&headers, rows);

    let t = board.totals();
    println!();
    println!(
        "Total: {} beds, {} occupied, {} reserved, {} free",
        t.total, t.occupied, t.reserved, t.available
    );
    Ok(())
}

fn icons(beds: &[BedState]) -> String {
    beds.iter()
        .map(|b| match b {
            BedState::Occupied => '#',
            BedState::Reserved => 'R',
            BedState::Available => '.',
        })
        .collect()
}
