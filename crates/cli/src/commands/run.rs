//! Play a scripted scenario against a live runtime.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use serde::Serialize;

use combat_core::{Battle, CharacterId, CombatEvent, ItemEffect, Participant, TurnEndReason};
use combat_runtime::{BattleHandle, Runtime, RuntimeConfig, RuntimeError};

use crate::dirs;
use crate::scenario::{Scenario, Step};

/// Play a scripted battle scenario
#[derive(Parser)]
pub struct RunScenario {
    /// Scenario file (TOML)
    #[arg(value_name = "SCENARIO")]
    scenario: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Record resolved actions to an action log
    #[arg(long)]
    record: bool,

    /// Custom data directory (defaults to platform-specific location)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    /// Human readable play-by-play
    Text,
    /// One JSON object per step
    Json,
}

/// Outcome of one scenario step, as printed in JSON mode.
#[derive(Serialize)]
struct StepReport<'a> {
    index: usize,
    step: &'a Step,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    events: Vec<CombatEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl RunScenario {
    pub async fn execute(self) -> Result<()> {
        let scenario = Scenario::load(&self.scenario)?;
        let names = scenario.names();
        tracing::info!(
            path = %self.scenario.display(),
            characters = scenario.characters.len(),
            steps = scenario.steps.len(),
            "loaded scenario"
        );

        let mut config = RuntimeConfig::from_env();
        // steps are scripted; nobody is idle
        config.turn_timeout = None;
        if self.record {
            let data_dir = self.data_dir.clone().unwrap_or_else(dirs::data_dir);
            config.action_log_dir = Some(dirs::actions_dir(&data_dir));
        }
        let log_dir = config.action_log_dir.clone();

        let runtime = Runtime::builder()
            .config(config)
            .characters(scenario.character_store()?)
            .items(scenario.item_catalog())
            .build()
            .await
            .context("Failed to start runtime")?;
        let handle = runtime.handle();

        let battle = handle
            .create_battle(scenario.battle_type, scenario.grid)
            .context("Failed to create battle")?;

        for character in &scenario.characters {
            let participant = battle
                .join(character.id, character.position)
                .await
                .with_context(|| format!("{} could not join", name(&names, character.id)))?;
            if self.format == OutputFormat::Text {
                println!(
                    "{} {} at {} with {} HP",
                    style("joined").bold().cyan(),
                    name(&names, character.id),
                    participant.position(),
                    participant.current_hp()
                );
            }
        }

        let order = battle.start().await.context("Failed to start battle")?;
        if self.format == OutputFormat::Text {
            let order: Vec<_> = order.iter().map(|id| name(&names, *id)).collect();
            println!("{} {}", style("initiative").bold().cyan(), order.join(" > "));
            println!();
        }

        for (index, step) in scenario.steps.iter().enumerate() {
            let outcome = apply_step(&battle, step).await;
            if let Err(error) = &outcome {
                tracing::debug!(index, %error, "scenario step rejected");
            }
            match self.format {
                OutputFormat::Text => print_step(index, step, &outcome, &names),
                OutputFormat::Json => {
                    let (events, error) = match outcome {
                        Ok(events) => (events, None),
                        Err(error) => (Vec::new(), Some(error.to_string())),
                    };
                    let report = StepReport {
                        index,
                        step,
                        events,
                        error,
                    };
                    println!("{}", serde_json::to_string(&report)?);
                }
            }
        }

        let snapshot = battle.snapshot().await?;
        match self.format {
            OutputFormat::Text => print_summary(&snapshot, &names),
            OutputFormat::Json => println!("{}", serde_json::to_string(&snapshot)?),
        }

        if let Some(dir) = log_dir {
            let written = runtime.flush_action_log().await?;
            if self.format == OutputFormat::Text {
                println!(
                    "{} {} record(s) in {}",
                    style("recorded").bold().cyan(),
                    written,
                    dir.display()
                );
            }
        }

        runtime.shutdown().await?;
        Ok(())
    }
}

async fn apply_step(battle: &BattleHandle, step: &Step) -> Result<Vec<CombatEvent>, RuntimeError> {
    match step {
        Step::Action(action) => battle
            .submit_action(action.clone())
            .await
            .map(|outcome| outcome.events),
        Step::EndTurn { character } => battle.end_turn(*character).await.map(|()| {
            vec![CombatEvent::TurnEnded {
                character: *character,
                reason: TurnEndReason::Voluntary,
            }]
        }),
        Step::Ready { character } => battle.ready(*character).await,
        Step::Pause => battle.pause().await.map(|()| vec![CombatEvent::BattlePaused]),
        Step::Resume => battle
            .resume()
            .await
            .map(|()| vec![CombatEvent::BattleResumed]),
    }
}

fn print_step(
    index: usize,
    step: &Step,
    outcome: &Result<Vec<CombatEvent>, RuntimeError>,
    names: &HashMap<CharacterId, String>,
) {
    let label = match step {
        Step::Action(action) => format!("{} {}", name(names, action.actor), action.action_type),
        Step::EndTurn { character } => format!("{} end_turn", name(names, *character)),
        Step::Ready { character } => format!("{} ready", name(names, *character)),
        Step::Pause => "pause".to_string(),
        Step::Resume => "resume".to_string(),
    };

    match outcome {
        Ok(events) => {
            println!("{} {}", style(format!("[{index:>2}]")).dim(), style(label).bold());
            for event in events {
                println!("       {}", describe(event, names));
            }
        }
        Err(error) => {
            println!(
                "{} {} {}",
                style(format!("[{index:>2}]")).dim(),
                style(label).bold(),
                style(format!("rejected: {error}")).red()
            );
        }
    }
}

fn describe(event: &CombatEvent, names: &HashMap<CharacterId, String>) -> String {
    match event {
        CombatEvent::ParticipantJoined {
            character,
            position,
            ..
        } => format!("{} joined at {position}", name(names, *character)),
        CombatEvent::BattleStarted { .. } => "battle started".to_string(),
        CombatEvent::ResourcesConsumed { character, cp, sp } => {
            format!("{} spent {cp} CP, {sp} SP", name(names, *character))
        }
        CombatEvent::Moved { character, from, to } => {
            format!("{} moved {from} -> {to}", name(names, *character))
        }
        CombatEvent::DamageDealt {
            attacker,
            target,
            amount,
            remaining_hp,
        } => format!(
            "{} hit {} for {} ({} HP left)",
            name(names, *attacker),
            name(names, *target),
            style(amount).red(),
            remaining_hp
        ),
        CombatEvent::HealingDone {
            healer,
            target,
            amount,
            remaining_hp,
        } => format!(
            "{} healed {} for {} ({} HP)",
            name(names, *healer),
            name(names, *target),
            style(amount).green(),
            remaining_hp
        ),
        CombatEvent::ItemUsed {
            character,
            item,
            target,
            effect,
            ..
        } => {
            let effect = match effect {
                ItemEffect::RestoreHealth(amount) => format!("restoring {amount} HP"),
                ItemEffect::RestoreActionPoints(amount) => format!("restoring {amount} AP"),
            };
            format!(
                "{} used item {item} on {}, {effect}",
                name(names, *character),
                name(names, *target)
            )
        }
        CombatEvent::ParticipantDefeated {
            character,
            defeated_by,
        } => format!(
            "{} was defeated by {}",
            style(name(names, *character)).red(),
            name(names, *defeated_by)
        ),
        CombatEvent::ParticipantFled { character } => {
            format!("{} fled", name(names, *character))
        }
        CombatEvent::ParticipantReady { character } => {
            format!("{} is ready", name(names, *character))
        }
        CombatEvent::RoundReset => "everyone is ready; AP restored".to_string(),
        CombatEvent::TurnEnded { character, reason } => {
            format!("{} ended turn ({reason})", name(names, *character))
        }
        CombatEvent::BattlePaused => "battle paused".to_string(),
        CombatEvent::BattleResumed => "battle resumed".to_string(),
        CombatEvent::BattleEnded { winner, reward } => match (winner, reward) {
            (Some(winner), Some(reward)) => format!(
                "{} wins, earning {} XP",
                style(name(names, *winner)).green().bold(),
                reward.experience
            ),
            (Some(winner), None) => format!("{} wins", name(names, *winner)),
            (None, _) => "battle ended without a winner".to_string(),
        },
    }
}

fn print_summary(battle: &Battle, names: &HashMap<CharacterId, String>) {
    println!();
    println!("{}", style("=== Battle Summary ===").bold().green());
    println!("{} {}", style("Battle:").bold().cyan(), battle.id());
    println!("{} {}", style("Status:").bold().cyan(), battle.status());
    if let Some(winner) = battle.winner() {
        println!("{} {}", style("Winner:").bold().cyan(), name(names, winner));
    }
    if let Some(reward) = battle.reward() {
        println!("{} {} XP", style("Reward:").bold().cyan(), reward.experience);
    }
    println!();

    for participant in battle.participants() {
        println!(
            "  {:<12} HP {:>4}/{:<4} AP {:>3}  {}  {}",
            name(names, participant.character_id()),
            participant.current_hp(),
            participant.max_hp(),
            participant.current_ap(),
            participant.position(),
            participant_state(participant)
        );
    }
}

fn participant_state(participant: &Participant) -> console::StyledObject<&'static str> {
    if participant.is_defeated() {
        style("defeated").red()
    } else if participant.has_fled() {
        style("fled").yellow()
    } else {
        style("active").green()
    }
}

fn name(names: &HashMap<CharacterId, String>, id: CharacterId) -> String {
    names.get(&id).cloned().unwrap_or_else(|| id.to_string())
}
