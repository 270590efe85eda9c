use crate::deck::{Deck, DeckError};
use crate::engine::{
    Action, DecisionView, RaiseAmount, RoundState, SeatInfo, SeatState, Street, ValidAction,
    ValidActions,
};
use crate::evaluator::{evaluate_holdem, HandCategory};
use crate::hand::{Board, HoleCards};
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PlayerStatus {
    Active,
    Folded,
    AllIn,
}

/// Where the current hand stands: a betting street, or finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Phase {
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl Phase {
    pub fn street(self) -> Option<Street> {
        match self {
            Phase::Preflop => Some(Street::Preflop),
            Phase::Flop => Some(Street::Flop),
            Phase::Turn => Some(Street::Turn),
            Phase::River => Some(Street::River),
            Phase::Showdown => None,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ActionError {
    #[error("the hand is over")]
    HandOver,
    #[error("player is not active")]
    PlayerNotActive,
    #[error("raising is not available")]
    RaiseNotAllowed,
    #[error("amount too small: min {min}, got {got}")]
    AmountTooSmall { min: u64, got: u64 },
    #[error("amount too large: max {max}, got {got}")]
    AmountTooLarge { max: u64, got: u64 },
    #[error("target must exceed current bet: current {current}, target {target}")]
    TargetTooLow { current: u64, target: u64 },
    #[error(transparent)]
    Showdown(#[from] ShowdownError),
    #[error(transparent)]
    Deck(#[from] DeckError),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ShowdownError {
    #[error("hand evaluation failed: {0}")]
    EvaluationFailed(String),
    #[error("invalid game state: {0}")]
    InvalidState(String),
}

#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Player {
    pub(crate) name: String,
    pub(crate) stack: u64,
    pub(crate) bet: u64,
    pub(crate) contributed: u64,
    pub(crate) status: PlayerStatus,
    pub(crate) hole: Option<HoleCards>,
}

impl Player {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stack(&self) -> u64 {
        self.stack
    }

    /// Chips put in during the current street.
    pub fn bet(&self) -> u64 {
        self.bet
    }

    /// Chips put in during the whole hand.
    pub fn contributed(&self) -> u64 {
        self.contributed
    }

    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    pub fn hole(&self) -> Option<HoleCards> {
        self.hole
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PotBreakdown {
    pub(crate) main: u64,
    pub(crate) sides: Vec<u64>,
}

/// No-limit Hold'em table: blinds, four betting streets, all-ins with side
/// pots, and a showdown that ranks hands by category only.
#[derive(Debug)]
#[non_exhaustive]
pub struct Game {
    pub(crate) small_blind: u64,
    pub(crate) big_blind: u64,

    pub(crate) deck: Deck,
    pub(crate) board: Board,
    pub(crate) players: Vec<Player>,
    pub(crate) pot: u64,
    pub(crate) dealer: usize,
    pub(crate) current: usize,
    pub(crate) phase: Phase,

    pub(crate) current_bet: u64,
    pub(crate) min_raise: u64,
    pub(crate) last_raiser: Option<usize>,
    pub(crate) last_raiser_acted: bool,
    pub(crate) round_starter: usize,
    /// Winners of the last completed hand, in seat order from the dealer's left.
    pub(crate) winners: Vec<usize>,
    pub(crate) showdown_categories: Vec<Option<HandCategory>>,
}

impl Game {
    pub fn new(num_players: usize, starting_stack: u64, small_blind: u64, big_blind: u64) -> Self {
        let names = (1..=num_players).map(|i| format!("P{i}")).collect();
        Self::with_names(names, starting_stack, small_blind, big_blind)
    }

    /// Seats named players in order; seat 0 holds the button for the first hand.
    pub fn with_names(
        names: Vec<String>,
        starting_stack: u64,
        small_blind: u64,
        big_blind: u64,
    ) -> Self {
        let num_players = names.len();
        let players = names
            .into_iter()
            .map(|name| Player {
                name,
                stack: starting_stack,
                bet: 0,
                contributed: 0,
                status: PlayerStatus::Active,
                hole: None,
            })
            .collect();
        Self {
            small_blind,
            big_blind,
            deck: Deck::standard(),
            board: Board::default(),
            players,
            pot: 0,
            // new_hand advances the button before dealing
            dealer: num_players.saturating_sub(1),
            current: 0,
            phase: Phase::Showdown,
            current_bet: 0,
            min_raise: big_blind,
            last_raiser: None,
            last_raiser_acted: false,
            round_starter: 0,
            winners: Vec::new(),
            showdown_categories: vec![None; num_players],
        }
    }

    pub fn small_blind(&self) -> u64 {
        self.small_blind
    }

    pub fn big_blind(&self) -> u64 {
        self.big_blind
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn pot(&self) -> u64 {
        self.pot
    }

    pub fn dealer(&self) -> usize {
        self.dealer
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_hand_over(&self) -> bool {
        matches!(self.phase, Phase::Showdown)
    }

    pub fn current_bet(&self) -> u64 {
        self.current_bet
    }

    pub fn min_raise(&self) -> u64 {
        self.min_raise
    }

    pub fn winners(&self) -> &[usize] {
        &self.winners
    }

    pub fn showdown_categories(&self) -> &[Option<HandCategory>] {
        &self.showdown_categories
    }

    /// Seats that still have chips to play with.
    pub fn funded_players(&self) -> usize {
        self.players.iter().filter(|p| p.stack > 0).count()
    }

    /// Shuffle with `rng`, move the button, post blinds and deal hole cards.
    pub fn new_hand<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), ActionError> {
        self.advance_dealer();
        self.reset_hand_state(rng);
        self.reset_players_for_new_hand();
        self.align_dealer_to_eligible();
        self.winners.clear();
        self.showdown_categories = vec![None; self.players.len()];
        self.deal_hole_cards();
        self.setup_preflop()
    }

    fn advance_dealer(&mut self) {
        if !self.players.is_empty() {
            self.dealer = (self.dealer + 1) % self.players.len();
        }
    }

    fn reset_hand_state<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.deck = Deck::standard();
        self.deck.shuffle_with(rng);
        self.board = Board::default();
        self.pot = 0;
        self.phase = Phase::Preflop;
        self.current_bet = 0;
        self.min_raise = self.big_blind;
        self.last_raiser = None;
        self.last_raiser_acted = false;
        self.round_starter = self.dealer;
        self.current = self.dealer;
    }

    fn reset_players_for_new_hand(&mut self) {
        for p in &mut self.players {
            p.bet = 0;
            p.contributed = 0;
            p.hole = None;
            p.status = if p.stack == 0 { PlayerStatus::Folded } else { PlayerStatus::Active };
        }
    }

    fn align_dealer_to_eligible(&mut self) {
        if self.players.is_empty() {
            return;
        }
        let n = self.players.len();
        let mut dealer = self.dealer;
        for _ in 0..n {
            if self.is_eligible(dealer) {
                break;
            }
            dealer = (dealer + 1) % n;
        }
        self.dealer = dealer;
    }

    fn deal_hole_cards(&mut self) {
        for p in &mut self.players {
            if matches!(p.status, PlayerStatus::Active) {
                if let (Some(a), Some(b)) = (self.deck.draw(), self.deck.draw()) {
                    p.hole = HoleCards::try_new(a, b).ok();
                }
            }
        }
    }

    fn setup_preflop(&mut self) -> Result<(), ActionError> {
        let eligible_count = self.count_eligible();
        if eligible_count < 2 {
            self.phase = Phase::Showdown;
            self.current = self.dealer;
            return Ok(());
        }
        // Heads-up the button posts the small blind and acts first preflop.
        let sb_pos =
            if eligible_count == 2 { self.dealer } else { self.next_eligible_from(self.dealer) };
        let bb_pos = self.next_eligible_from(sb_pos);
        let bb_paid = self.post_blinds(sb_pos, bb_pos);
        self.current_bet = bb_paid;
        // Minimum raise is based on what the BB actually posted, not the nominal blind
        self.min_raise = bb_paid.max(1);
        self.last_raiser = Some(bb_pos);
        self.last_raiser_acted = false;
        self.current =
            if eligible_count == 2 { self.dealer } else { self.next_eligible_from(bb_pos) };
        if !self.is_eligible(self.current) {
            self.current = self.next_eligible_from(self.current);
        }
        self.round_starter = self.current;
        self.maybe_force_showdown()
    }

    fn post_blinds(&mut self, sb_pos: usize, bb_pos: usize) -> u64 {
        let sb_paid = self.post(sb_pos, self.small_blind);
        let bb_paid = self.post(bb_pos, self.big_blind);
        self.pot += sb_paid + bb_paid;
        bb_paid
    }

    fn post(&mut self, idx: usize, amount: u64) -> u64 {
        let p = &mut self.players[idx];
        let v = p.stack.min(amount);
        p.stack -= v;
        p.bet += v;
        p.contributed += v;
        if p.stack == 0 {
            p.status = PlayerStatus::AllIn;
        }
        v
    }

    /// Main pot and side pots. Side pots only open above an all-in player's
    /// total contribution.
    pub(crate) fn pot_breakdown(&self) -> PotBreakdown {
        let mut caps: Vec<u64> = self
            .players
            .iter()
            .filter(|p| matches!(p.status, PlayerStatus::AllIn) && p.contributed > 0)
            .map(|p| p.contributed)
            .collect();
        caps.sort_unstable();
        caps.dedup();
        caps.push(u64::MAX);

        let mut pots: Vec<u64> = Vec::new();
        let mut prev = 0u64;
        for cap in caps {
            let amount: u64 = self
                .players
                .iter()
                .map(|p| p.contributed.min(cap).saturating_sub(prev))
                .sum();
            if amount > 0 {
                pots.push(amount);
            }
            prev = cap;
        }
        let main = pots.first().copied().unwrap_or(0);
        let sides = pots.get(1..).map(<[u64]>::to_vec).unwrap_or_default();
        PotBreakdown { main, sides }
    }

    fn deal_next_street(&mut self) -> Result<(), ActionError> {
        match self.phase {
            Phase::Preflop => {
                let flop = self.deck.draw_n(3)?;
                self.board.extend(flop);
                self.phase = Phase::Flop;
                self.reset_bets_set_current_postflop();
            }
            Phase::Flop | Phase::Turn => {
                if let Some(c) = self.deck.draw() {
                    self.board.push(c);
                }
                self.phase = if self.phase == Phase::Flop { Phase::Turn } else { Phase::River };
                self.reset_bets_set_current_postflop();
            }
            Phase::River => {
                self.phase = Phase::Showdown;
                self.finish_showdown()?;
            }
            Phase::Showdown => {}
        }
        Ok(())
    }

    fn reset_bets_set_current_postflop(&mut self) {
        for p in &mut self.players {
            p.bet = 0;
        }
        if self.players.is_empty() {
            return;
        }
        // Start from first seat left of dealer; skip ineligible seats
        self.current = self.next_eligible_from(self.dealer);
        self.current_bet = 0;
        self.min_raise = self.big_blind.max(1);
        self.last_raiser = None;
        self.last_raiser_acted = false;
        self.round_starter = self.current;
    }

    fn is_eligible(&self, idx: usize) -> bool {
        matches!(self.players[idx].status, PlayerStatus::Active)
    }

    fn count_eligible(&self) -> usize {
        self.players.iter().filter(|p| matches!(p.status, PlayerStatus::Active)).count()
    }

    fn next_eligible_from(&self, start: usize) -> usize {
        if self.players.is_empty() {
            return 0;
        }
        let n = self.players.len();
        let mut i = (start + 1) % n;
        for _ in 0..n {
            if self.is_eligible(i) {
                return i;
            }
            i = (i + 1) % n;
        }
        // No eligible players left; keep the cursor where it is to avoid an infinite loop.
        start % n
    }

    pub fn to_call(&self, idx: usize) -> u64 {
        if self.is_hand_over() {
            return 0;
        }
        self.current_bet.saturating_sub(self.players[idx].bet)
    }

    /// Legal raise-to totals for seat `idx`, or `None` when raising is closed:
    /// no chips beyond a call, or nobody left who could respond.
    fn raise_bounds(&self, idx: usize) -> Option<(u64, u64)> {
        let p = &self.players[idx];
        let max_total = p.bet + p.stack;
        if max_total <= self.current_bet {
            return None;
        }
        let opponents_can_act = self
            .players
            .iter()
            .enumerate()
            .any(|(i, q)| i != idx && matches!(q.status, PlayerStatus::Active));
        if !opponents_can_act {
            return None;
        }
        let min_total = if self.current_bet == 0 {
            self.big_blind.max(1)
        } else {
            self.current_bet + self.min_raise
        };
        Some((min_total.min(max_total), max_total))
    }

    /// Actions open to the player on turn; empty once the hand is over.
    pub fn valid_actions(&self) -> ValidActions {
        if self.is_hand_over() || !self.is_eligible(self.current) {
            return ValidActions::default();
        }
        let p = &self.players[self.current];
        let mut actions = vec![
            ValidAction::Fold,
            ValidAction::Call { amount: self.to_call(self.current).min(p.stack) },
        ];
        if let Some((min, max)) = self.raise_bounds(self.current) {
            let amount =
                if min == max { RaiseAmount::Fixed(max) } else { RaiseAmount::Range { min, max } };
            actions.push(ValidAction::Raise { amount });
        }
        ValidActions::new(actions)
    }

    /// Public state as seen by the player on turn.
    pub fn round_state(&self) -> Option<RoundState> {
        let street = self.phase.street()?;
        let seats = self
            .players
            .iter()
            .map(|p| SeatInfo {
                name: p.name.clone(),
                stack: p.stack,
                state: match p.status {
                    PlayerStatus::Active => SeatState::Participating,
                    PlayerStatus::AllIn => SeatState::AllIn,
                    PlayerStatus::Folded => SeatState::Folded,
                },
            })
            .collect();
        Some(RoundState {
            street,
            main_pot: self.pot_breakdown().main,
            community: self.board.as_slice().to_vec(),
            seats,
        })
    }

    /// What the player on turn gets to see, or `None` when nobody is to act.
    pub fn decision_view(&self) -> Option<DecisionView> {
        let round_state = self.round_state()?;
        let p = self.players.get(self.current)?;
        if !matches!(p.status, PlayerStatus::Active) {
            return None;
        }
        Some(DecisionView {
            player: p.name.clone(),
            hole: p.hole?,
            valid_actions: self.valid_actions(),
            round_state,
        })
    }

    /// Apply an adapter-level action for the player on turn.
    pub fn apply(&mut self, action: Action) -> Result<(), ActionError> {
        match action {
            Action::Fold => self.action_fold(),
            Action::Call => self.action_check_call(),
            Action::Raise(amount) => {
                self.ensure_can_act()?;
                let (min, _) = self.raise_bounds(self.current).ok_or(ActionError::RaiseNotAllowed)?;
                self.action_raise_to(amount.unwrap_or(min))
            }
        }
    }

    fn ensure_can_act(&self) -> Result<(), ActionError> {
        if self.is_hand_over() {
            return Err(ActionError::HandOver);
        }
        if !self.is_eligible(self.current) {
            return Err(ActionError::PlayerNotActive);
        }
        Ok(())
    }

    pub fn action_fold(&mut self) -> Result<(), ActionError> {
        self.ensure_can_act()?;
        self.players[self.current].status = PlayerStatus::Folded;
        if self.count_eligible() <= 1 && self.contenders() <= 1 {
            self.phase = Phase::Showdown;
            return Ok(self.finish_showdown()?);
        }
        self.advance_or_move()
    }

    pub fn action_check_call(&mut self) -> Result<(), ActionError> {
        self.ensure_can_act()?;
        let to_call = self.to_call(self.current);
        if to_call > 0 {
            let pay = self.post(self.current, to_call);
            self.pot += pay;
        }
        self.advance_or_move()
    }

    /// Bet (when nobody has bet this street) or raise to `amount` total.
    /// A short all-in below the minimum is accepted.
    pub fn action_raise_to(&mut self, amount: u64) -> Result<(), ActionError> {
        self.ensure_can_act()?;
        let (min, max) = self.raise_bounds(self.current).ok_or(ActionError::RaiseNotAllowed)?;
        if amount > max {
            return Err(ActionError::AmountTooLarge { max, got: amount });
        }
        if amount < min {
            return Err(ActionError::AmountTooSmall { min, got: amount });
        }
        self.place_to_amount(amount)
    }

    fn place_to_amount(&mut self, target_total: u64) -> Result<(), ActionError> {
        let idx = self.current;
        let curr = self.players[idx].bet;
        if target_total <= curr {
            return Err(ActionError::TargetTooLow { current: curr, target: target_total });
        }
        let pay = self.post(idx, target_total - curr);
        self.pot += pay;
        let new_bet = self.players[idx].bet;

        if new_bet > self.current_bet {
            let raise_amt = new_bet - self.current_bet;
            // Only a full raise (or the street's opening bet) reopens the action.
            if raise_amt >= self.min_raise || self.last_raiser.is_none() {
                self.min_raise = self.min_raise.max(raise_amt);
                self.last_raiser = Some(idx);
                self.last_raiser_acted = true;
                self.round_starter = idx;
            }
            self.current_bet = new_bet;
        }
        let prev = idx;
        self.current = self.next_eligible_from(prev);
        if self.should_end_round(prev) {
            self.deal_next_street()?;
        }
        self.maybe_force_showdown()
    }

    fn advance_or_move(&mut self) -> Result<(), ActionError> {
        let prev = self.current;
        self.current = self.next_eligible_from(prev);
        if self.should_end_round(prev) {
            self.deal_next_street()?;
        }
        if self.last_raiser == Some(prev) && !self.last_raiser_acted {
            self.last_raiser_acted = true;
        }
        self.maybe_force_showdown()
    }

    fn should_end_round(&self, prev_actor: usize) -> bool {
        if self.count_eligible() <= 1 {
            if let Some(p) = self.players.iter().find(|p| matches!(p.status, PlayerStatus::Active))
            {
                if p.bet < self.current_bet {
                    return false;
                }
            }
            return true;
        }
        if self.current_bet == 0 && self.last_raiser.is_none() {
            return self.current == self.round_starter;
        }
        let all_matched = || {
            self.players
                .iter()
                .filter(|p| matches!(p.status, PlayerStatus::Active))
                .all(|p| p.bet == self.current_bet)
        };
        match self.last_raiser {
            // End when action returns to last raiser and everyone matched
            Some(lr) if self.last_raiser_acted => self.current == lr && all_matched(),
            Some(lr) => prev_actor == lr && all_matched(),
            None => false,
        }
    }

    /// Players still holding cards, all-in included.
    fn contenders(&self) -> usize {
        self.players
            .iter()
            .filter(|p| !matches!(p.status, PlayerStatus::Folded) && p.hole.is_some())
            .count()
    }

    fn complete_board(&mut self) {
        while self.board.len() < 5 {
            match self.deck.draw() {
                Some(c) => self.board.push(c),
                None => break,
            }
        }
    }

    /// Showdown: rank contenders by hand category and pay every pot level.
    ///
    /// Equal categories split a pot; odd chips go to the winners closest to
    /// the dealer's left.
    pub fn finish_showdown(&mut self) -> Result<(), ShowdownError> {
        let total_pot: u64 = self.players.iter().map(|p| p.contributed).sum();
        self.phase = Phase::Showdown;
        if total_pot == 0 {
            return Ok(());
        }
        self.pot = total_pot;
        for p in &mut self.players {
            p.bet = 0;
        }

        let contenders: Vec<usize> = self
            .players
            .iter()
            .enumerate()
            .filter(|(_, p)| !matches!(p.status, PlayerStatus::Folded) && p.hole.is_some())
            .map(|(i, _)| i)
            .collect();
        let n = self.players.len();
        let start = if n == 0 { 0 } else { (self.dealer + 1) % n };

        if contenders.len() <= 1 {
            // Uncontested: last player standing, or left of the dealer if nobody is.
            let i = contenders.first().copied().unwrap_or(start);
            self.players[i].stack += self.pot;
            self.pot = 0;
            self.winners = vec![i];
            self.reset_betting_state();
            return Ok(());
        }

        self.complete_board();
        if self.board.len() < 5 {
            return Err(ShowdownError::InvalidState(format!(
                "deck exhausted with {} board cards",
                self.board.len()
            )));
        }

        let mut categories: Vec<Option<HandCategory>> = vec![None; n];
        for &i in &contenders {
            let hole = self.players[i].hole.as_ref().ok_or_else(|| {
                ShowdownError::InvalidState(format!("contender {i} missing hole cards"))
            })?;
            let cat = evaluate_holdem(hole, &self.board)
                .map_err(|e| ShowdownError::EvaluationFailed(format!("player {i}: {e}")))?;
            categories[i] = Some(cat);
        }

        let mut levels: Vec<u64> =
            self.players.iter().map(|p| p.contributed).filter(|&c| c > 0).collect();
        levels.sort_unstable();
        levels.dedup();

        let mut winnings = vec![0u64; n];
        let mut prev = 0u64;
        for lvl in levels {
            let contributors: Vec<usize> = self
                .players
                .iter()
                .enumerate()
                .filter(|(_, p)| p.contributed >= lvl)
                .map(|(i, _)| i)
                .collect();
            let amount = (lvl - prev) * contributors.len() as u64;
            prev = lvl;
            if amount == 0 {
                continue;
            }
            let best = contributors.iter().filter_map(|&i| categories[i]).max();
            let Some(best) = best else {
                // Only folded players reached this level; the first contender takes it.
                let i = contenders[0];
                winnings[i] = winnings[i].saturating_add(amount);
                continue;
            };
            let mut pot_winners: Vec<usize> =
                contributors.iter().copied().filter(|&i| categories[i] == Some(best)).collect();
            pot_winners.sort_by_key(|&i| (i + n - start) % n);
            let per = amount / pot_winners.len() as u64;
            let mut rem = (amount % pot_winners.len() as u64) as usize;
            for &i in &pot_winners {
                let mut amt = per;
                if rem > 0 {
                    amt += 1;
                    rem -= 1;
                }
                winnings[i] = winnings[i].saturating_add(amt);
            }
        }

        let mut winners: Vec<usize> = Vec::new();
        for (i, amt) in winnings.into_iter().enumerate() {
            if amt == 0 {
                continue;
            }
            self.players[i].stack += amt;
            winners.push(i);
        }
        winners.sort_by_key(|&i| (i + n - start) % n);
        self.pot = 0;
        self.showdown_categories = categories;
        self.winners = winners;
        self.reset_betting_state();
        Ok(())
    }

    fn reset_betting_state(&mut self) {
        self.current_bet = 0;
        self.min_raise = self.big_blind;
        self.last_raiser = None;
        self.last_raiser_acted = false;
        self.round_starter = self.current;
    }

    /// Run the hand out once at most one player can still bet.
    fn maybe_force_showdown(&mut self) -> Result<(), ActionError> {
        if self.is_hand_over() {
            return Ok(());
        }
        let active = self.count_eligible();
        if active > 1 {
            return Ok(());
        }
        if active == 1 {
            if let Some(p) = self.players.iter().find(|p| matches!(p.status, PlayerStatus::Active))
            {
                if p.bet < self.current_bet {
                    return Ok(());
                }
            }
        }
        self.phase = Phase::Showdown;
        Ok(self.finish_showdown()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn mk_game(n: usize) -> Game {
        Game::new(n, 1000, 5, 10)
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(11)
    }

    fn at_showdown(g: &mut Game, board: &str, holes: &[&str], contributed: &[u64]) {
        g.phase = Phase::Showdown;
        g.board = board.parse().unwrap();
        for (i, (h, c)) in holes.iter().zip(contributed).enumerate() {
            let p = &mut g.players[i];
            p.hole = Some(h.parse().unwrap());
            p.status = PlayerStatus::AllIn;
            p.stack = 0;
            p.contributed = *c;
        }
        g.pot = contributed.iter().sum();
    }

    #[test]
    fn short_deck_fails_the_flop_instead_of_dealing_nothing() {
        let mut g = mk_game(2);
        g.new_hand(&mut rng()).unwrap();
        g.deck = Deck::without(&Deck::standard().as_slice()[..50]);
        let err = g.deal_next_street().unwrap_err();
        assert_eq!(err, ActionError::Deck(DeckError::InsufficientDeck { needed: 3, remaining: 2 }));
        assert!(g.board.is_empty());
    }

    #[test]
    fn side_pots_distribute_across_all_in_levels() {
        let mut g = mk_game(3);
        // queens pair, kings trips, seven-high
        at_showdown(&mut g, "2c 3d 4h 8s Kc", &["Qs Qh", "Ks Kh", "7c 6c"], &[100, 50, 200]);
        g.finish_showdown().unwrap();

        assert_eq!(g.players[1].stack, 150, "main pot should go to best hand");
        assert_eq!(g.players[0].stack, 100, "side pot should go to next best hand");
        assert_eq!(g.players[2].stack, 100, "single-eligible side pot goes to contributor");
    }

    #[test]
    fn split_main_pot_and_single_side_pot() {
        let mut g = mk_game(3);
        at_showdown(&mut g, "Ac Kd Qh Js 2c", &["Tc 3d", "Th 4s", "9c 9d"], &[50, 50, 200]);
        g.finish_showdown().unwrap();

        assert_eq!(g.players[0].stack, 75, "main pot split between tied winners");
        assert_eq!(g.players[1].stack, 75, "main pot split between tied winners");
        assert_eq!(g.players[2].stack, 150, "side pot goes to lone contributor");
    }

    #[test]
    fn same_category_splits_regardless_of_kicker() {
        let mut g = mk_game(2);
        at_showdown(&mut g, "2c 7d 9h Js 4c", &["Ah Kd", "Qh 3s"], &[100, 100]);
        g.finish_showdown().unwrap();
        assert_eq!(g.players[0].stack, 100);
        assert_eq!(g.players[1].stack, 100);
        assert_eq!(g.showdown_categories()[0], Some(HandCategory::HighCard));
    }

    #[test]
    fn odd_chip_split_uses_seat_order() {
        let mut g = mk_game(3);
        g.dealer = 0;
        at_showdown(&mut g, "Ac Kd Qh Js 2c", &["Tc 3d", "Th 4s", "9c 9d"], &[1, 1, 2]);
        g.finish_showdown().unwrap();

        assert_eq!(g.players[0].stack, 1, "tie loser should receive smaller share");
        assert_eq!(g.players[1].stack, 2, "odd chip awarded by seat order");
        assert_eq!(g.players[2].stack, 1, "single-eligible side pot still awarded");
    }

    #[test]
    fn showdown_deals_remaining_board_cards() {
        let mut g = Game::new(3, 100, 5, 10);
        g.new_hand(&mut rng()).unwrap();
        g.players[2].status = PlayerStatus::Folded;
        g.players[0].status = PlayerStatus::AllIn;
        g.players[1].status = PlayerStatus::AllIn;
        g.players[0].contributed = 50;
        g.players[1].contributed = 50;
        g.players[2].contributed = 0;
        g.board = Board::default();

        g.finish_showdown().unwrap();

        assert_eq!(g.board.len(), 5);
        assert_eq!(g.pot, 0);
        assert!(!g.winners.is_empty());
    }

    #[test]
    fn zero_stack_players_sit_out_next_hand() {
        let mut g = Game::new(3, 100, 5, 10);
        g.players[1].stack = 0;
        g.new_hand(&mut rng()).unwrap();

        let busted = &g.players[1];
        assert!(matches!(busted.status, PlayerStatus::Folded));
        assert!(busted.hole.is_none());
        assert_eq!(busted.contributed, 0);
        assert_ne!(g.current, 1);
    }

    #[test]
    fn heads_up_blinds_and_preflop_order() {
        let mut g = mk_game(2);
        g.new_hand(&mut rng()).unwrap();
        let sb = g.dealer;
        let bb = (sb + 1) % 2;
        assert_eq!(g.players[sb].bet, 5);
        assert_eq!(g.players[bb].bet, 10);
        assert_eq!(g.current, sb, "button acts first preflop");

        g.action_check_call().unwrap();
        assert_eq!(g.current, bb, "big blind gets the option");
        g.action_check_call().unwrap();
        assert_eq!(g.phase, Phase::Flop);
        assert_eq!(g.current, bb, "big blind acts first after the flop");
    }

    #[test]
    fn valid_actions_offer_call_and_raise_range() {
        let mut g = mk_game(2);
        g.new_hand(&mut rng()).unwrap();
        let va = g.valid_actions();
        assert!(va.can_fold());
        assert_eq!(va.call_amount(), Some(5));
        assert_eq!(va.raise(), Some(RaiseAmount::Range { min: 20, max: 1000 }));
    }

    #[test]
    fn raise_none_uses_minimum() {
        let mut g = mk_game(2);
        g.new_hand(&mut rng()).unwrap();
        g.apply(Action::Raise(None)).unwrap();
        assert_eq!(g.current_bet, 20);
        let err = g.apply(Action::Raise(Some(25))).unwrap_err();
        assert_eq!(err, ActionError::AmountTooSmall { min: 30, got: 25 });
    }

    #[test]
    fn all_in_call_runs_out_the_board() {
        let mut g = mk_game(2);
        g.new_hand(&mut rng()).unwrap();
        g.apply(Action::Raise(Some(1000))).unwrap();
        assert!(g.valid_actions().raise().is_none(), "nobody left to raise against");
        g.apply(Action::Call).unwrap();
        assert!(g.is_hand_over());
        assert_eq!(g.board.len(), 5);
        let total: u64 = g.players.iter().map(|p| p.stack).sum();
        assert_eq!(total, 2000);
    }

    #[test]
    fn main_pot_excludes_chips_above_all_in() {
        let mut g = mk_game(3);
        g.players[0].contributed = 50;
        g.players[0].status = PlayerStatus::AllIn;
        g.players[1].contributed = 120;
        g.players[2].contributed = 120;
        let pots = g.pot_breakdown();
        assert_eq!(pots.main, 150);
        assert_eq!(pots.sides, vec![140]);
    }

    #[test]
    fn fold_awards_pot_to_last_player() {
        let mut g = mk_game(2);
        g.new_hand(&mut rng()).unwrap();
        let sb = g.current;
        g.apply(Action::Fold).unwrap();
        assert!(g.is_hand_over());
        assert_eq!(g.players[sb].stack, 995);
        assert_eq!(g.players[1 - sb].stack, 1005);
    }

    #[test]
    fn round_state_reports_street_and_seats() {
        let mut g = Game::with_names(vec!["hero".into(), "villain".into()], 500, 10, 20);
        g.new_hand(&mut rng()).unwrap();
        let view = g.decision_view().unwrap();
        assert_eq!(view.round_state.street, Street::Preflop);
        assert_eq!(view.round_state.main_pot, 30);
        assert!(view.round_state.community.is_empty());
        assert!(view.round_state.seat("hero").is_some());
        assert_eq!(view.player, g.players[g.current].name);
    }
}
