use std::collections::BTreeMap;

use monopoly_backend::domain::PlayerId;

use crate::runner::{GameReport, Outcome};

#[derive(Debug, Default)]
pub struct Summary {
    games: u32,
    wins: BTreeMap<PlayerId, u32>,
    turns_in_won_games: u64,
    bankruptcies: u64,
    stalled: u32,
    frozen: u32,
}

impl Summary {
    pub fn record(&mut self, report: &GameReport) {
        self.games += 1;
        self.bankruptcies += u64::from(report.bankruptcies);
        match report.outcome {
            Outcome::Won => {
                if let Some(seat) = report.winner {
                    *self.wins.entry(seat).or_default() += 1;
                }
                self.turns_in_won_games += u64::from(report.turns);
            }
            Outcome::Stalled => self.stalled += 1,
            Outcome::Frozen => self.frozen += 1,
        }
    }

    pub fn frozen(&self) -> u32 {
        self.frozen
    }

    pub fn print(&self) {
        let won: u32 = self.wins.values().sum();
        println!("games:          {}", self.games);
        for (seat, wins) in &self.wins {
            println!("  seat {seat} wins:   {wins}");
        }
        if won > 0 {
            println!(
                "avg turns:      {:.1}",
                self.turns_in_won_games as f64 / f64::from(won)
            );
        }
        println!("bankruptcies:   {}", self.bankruptcies);
        println!("stalled games:  {}", self.stalled);
        println!("frozen games:   {}", self.frozen);
    }
}
