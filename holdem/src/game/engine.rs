//! Texas Hold'em rules engine.
//!
//! [`TexasHoldem`] owns one hand: the roster, the deck, the board, the pot and
//! the turn pointer. It carries no lock. Callers are expected to serialize
//! access (the table actor does).
//!
//! Every mutating operation is transactional. The new state is computed on a
//! copy and only committed when the whole operation succeeds, so a rejected
//! action leaves the hand exactly as it was.

use super::{
    constants::{
        BIG_BLIND, FLOP_CARDS, HOLE_CARDS, LAST_MAN_STANDING, MAX_PLAYERS, NO_ONE_WON,
        RAISE_INCREMENT, REQUIRED_PLAYERS, SMALL_BLIND,
    },
    entities::{Action, Card, Chips, Deck, HandView, Player, Round, Username},
    errors::GameError,
    eval::{Rank, best_hand},
};

/// What a disconnect did to the hand.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DisconnectOutcome {
    /// The hand was not running or the seat was already out.
    Unchanged,
    /// The seat was folded while someone else had the turn.
    Folded,
    /// The seat had the turn and was auto-folded. Everyone needs fresh state.
    OwnTurn,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TexasHoldem {
    deck: Deck,
    community_cards: Vec<Card>,
    players: Vec<Player>,
    round: Round,
    current_player: usize,
    current_bet: Chips,
    pot: Chips,
    started: bool,
    game_over: bool,
    winner: Option<Username>,
    best_rank: Option<String>,
    best_hand: Vec<Card>,
}

impl Default for TexasHoldem {
    fn default() -> Self {
        Self::new()
    }
}

impl TexasHoldem {
    /// A hand with a freshly shuffled deck and no players.
    pub fn new() -> Self {
        Self::with_deck(Deck::shuffled())
    }

    pub fn with_deck(deck: Deck) -> Self {
        Self {
            deck,
            community_cards: Vec::new(),
            players: Vec::new(),
            round: Round::PreFlop,
            current_player: 0,
            current_bet: 0,
            pot: 0,
            started: false,
            game_over: false,
            winner: None,
            best_rank: None,
            best_hand: Vec::new(),
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn community_cards(&self) -> &[Card] {
        &self.community_cards
    }

    pub fn round(&self) -> Round {
        self.round
    }

    pub fn current_player(&self) -> usize {
        self.current_player
    }

    pub fn current_bet(&self) -> Chips {
        self.current_bet
    }

    pub fn pot(&self) -> Chips {
        self.pot
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn winner(&self) -> Option<&Username> {
        self.winner.as_ref()
    }

    pub fn best_rank(&self) -> Option<&str> {
        self.best_rank.as_deref()
    }

    pub fn best_hand(&self) -> &[Card] {
        &self.best_hand
    }

    pub fn contains_player(&self, name: &str) -> bool {
        self.seat_of(name).is_some()
    }

    fn seat_of(&self, name: &str) -> Option<usize> {
        self.players.iter().position(|p| p.name == name)
    }

    fn active_count(&self) -> usize {
        self.players.iter().filter(|p| p.active).count()
    }

    /// Adds a seat. Re-adding a name that is already seated is a no-op so
    /// that reconnecting clients don't duplicate their seat.
    pub fn add_player(&mut self, name: &str, starting_stack: i64) -> Result<(), GameError> {
        let stack =
            Chips::try_from(starting_stack).map_err(|_| GameError::InvalidStack(starting_stack))?;
        if self.contains_player(name) {
            return Ok(());
        }
        if self.started {
            return Err(GameError::AlreadyStarted);
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(GameError::TableFull);
        }

        self.players.push(Player::new(Username::new(name), stack));
        Ok(())
    }

    /// Deals hole cards and posts the opening blinds: small blind on the
    /// second-to-last seat, big blind on the last seat. Seat 0 acts first.
    pub fn start_game(&mut self) -> Result<(), GameError> {
        if self.started {
            return Err(GameError::AlreadyStarted);
        }
        if self.players.len() < REQUIRED_PLAYERS {
            return Err(GameError::NotEnoughPlayers);
        }

        let mut next = self.clone();
        next.deal()?;
        *self = next;
        Ok(())
    }

    fn deal(&mut self) -> Result<(), GameError> {
        self.started = true;
        self.round = Round::PreFlop;
        self.pot = 0;
        for idx in 0..self.players.len() {
            let cards = self.deck.draw(HOLE_CARDS)?;
            let player = &mut self.players[idx];
            player.hole_cards = cards;
            player.active = true;
            player.bet = 0;
            player.last_action = None;
        }

        let big_blind = self.players.len() - 1;
        self.post_blind(big_blind, BIG_BLIND)?;
        self.post_blind(big_blind - 1, SMALL_BLIND)?;

        self.current_bet = BIG_BLIND;
        self.current_player = 0;
        Ok(())
    }

    fn post_blind(&mut self, idx: usize, amount: Chips) -> Result<(), GameError> {
        let player = &mut self.players[idx];
        if player.stack < amount {
            return Err(GameError::InsufficientFunds {
                required: amount,
                available: player.stack,
            });
        }
        player.stack -= amount;
        player.bet = amount;
        self.pot += amount;
        Ok(())
    }

    /// Applies `action` for `name` and moves the hand forward.
    ///
    /// The betting round closes when the turn pointer wraps past seat 0.
    /// This does not check that all active bets are level.
    pub fn advance_state(&mut self, name: &str, action: Action) -> Result<(), GameError> {
        let mut next = self.clone();
        next.apply_action(name, action)?;
        *self = next;
        Ok(())
    }

    fn apply_action(&mut self, name: &str, action: Action) -> Result<(), GameError> {
        if self.players.len() < REQUIRED_PLAYERS {
            return Err(GameError::NotEnoughPlayers);
        }
        let idx = self.seat_of(name).ok_or(GameError::PlayerNotInHand)?;
        if idx != self.current_player {
            return Err(GameError::WrongTurn);
        }
        if !self.players[idx].active {
            return Err(GameError::InvalidAction);
        }
        if !self.started || self.game_over {
            return Err(GameError::HandNotInProgress);
        }

        match action {
            Action::Call => {
                let target = self.current_bet;
                self.commit_bet(idx, target)?;
            }
            Action::Raise => {
                let target = self.current_bet + RAISE_INCREMENT;
                self.commit_bet(idx, target)?;
                self.current_bet = target;
            }
            Action::Check => {
                if self.round == Round::PreFlop {
                    return Err(GameError::InvalidAction);
                }
                let everyone_before_checked = self.players[..idx]
                    .iter()
                    .filter(|p| p.active)
                    .all(|p| p.last_action == Some(Action::Check));
                if !everyone_before_checked {
                    return Err(GameError::InvalidAction);
                }
            }
            Action::Fold => {
                self.players[idx].active = false;
            }
        }
        self.players[idx].last_action = Some(action);

        if self.active_count() == 1 {
            self.finish_last_man_standing();
            return Ok(());
        }

        let (next, looped) = self.get_next_player(self.current_player);
        self.current_player = next.ok_or(GameError::HandNotInProgress)?;
        if !looped {
            return Ok(());
        }

        match self.round {
            Round::PreFlop => {
                let cards = self.deck.draw(FLOP_CARDS)?;
                self.community_cards.extend(cards);
                self.round = Round::Flop;
            }
            Round::Flop => {
                let cards = self.deck.draw(1)?;
                self.community_cards.extend(cards);
                self.round = Round::Turn;
            }
            Round::Turn => {
                let cards = self.deck.draw(1)?;
                self.community_cards.extend(cards);
                self.round = Round::River;
            }
            Round::River => {
                self.game_over = true;
                return self.showdown();
            }
        }

        self.begin_round()
    }

    /// Moves `target - bet` chips from the seat's stack into the pot.
    fn commit_bet(&mut self, idx: usize, target: Chips) -> Result<(), GameError> {
        let player = &mut self.players[idx];
        if player.stack < target {
            return Err(GameError::InsufficientFunds {
                required: target,
                available: player.stack,
            });
        }
        let delta = target.saturating_sub(player.bet);
        player.stack -= delta;
        player.bet = target;
        self.pot += delta;
        Ok(())
    }

    /// Resets the round's bets and actions, then posts blinds on the next two
    /// active seats after seat 0. Blinds go into the pot like any other bet.
    fn begin_round(&mut self) -> Result<(), GameError> {
        for player in self.players.iter_mut() {
            player.bet = 0;
            if player.active {
                player.last_action = None;
            }
        }

        let small_blind = self
            .get_next_player(0)
            .0
            .ok_or(GameError::HandNotInProgress)?;
        let big_blind = self
            .get_next_player(small_blind)
            .0
            .ok_or(GameError::HandNotInProgress)?;
        self.post_blind(small_blind, SMALL_BLIND)?;
        self.post_blind(big_blind, BIG_BLIND)?;
        self.current_bet = BIG_BLIND;
        Ok(())
    }

    fn finish_last_man_standing(&mut self) {
        self.game_over = true;
        self.winner = self
            .players
            .iter()
            .find(|p| p.active)
            .map(|p| p.name.clone());
        self.best_rank = Some(LAST_MAN_STANDING.to_string());
        self.best_hand.clear();
    }

    fn showdown(&mut self) -> Result<(), GameError> {
        match self.determine_winner()? {
            Some((winner, rank, hand)) => {
                self.winner = Some(winner);
                self.best_rank = Some(rank.to_string());
                self.best_hand = hand;
            }
            None => {
                self.winner = None;
                self.best_rank = Some(NO_ONE_WON.to_string());
                self.best_hand.clear();
            }
        }
        Ok(())
    }

    /// Best 5-of-7 hand among the active seats. Equal hands go to whoever
    /// sits first.
    fn determine_winner(&self) -> Result<Option<(Username, Rank, Vec<Card>)>, GameError> {
        if !self.game_over {
            return Err(GameError::HandStillInProgress);
        }

        let mut best = None;
        for player in self.players.iter().filter(|p| p.active) {
            let mut pool = player.hole_cards.clone();
            pool.extend_from_slice(&self.community_cards);
            let Some((strength, hand)) = best_hand(&pool) else {
                continue;
            };
            let better = match &best {
                Some((_, best_strength, _)) => strength > *best_strength,
                None => true,
            };
            if better {
                best = Some((player.name.clone(), strength, hand));
            }
        }

        Ok(best.map(|(name, strength, hand)| (name, strength.rank, hand)))
    }

    /// Next active seat after `current`, cycling through the roster, and
    /// whether the scan passed seat 0 on the way.
    pub fn get_next_player(&self, current: usize) -> (Option<usize>, bool) {
        let n = self.players.len();
        let mut looped = false;
        for step in 1..n {
            let idx = (current + step) % n;
            if idx == 0 {
                looped = true;
            }
            if self.players[idx].active {
                return (Some(idx), looped);
            }
        }
        (None, true)
    }

    /// The hand as `viewer` may see it: only their own hole cards while the
    /// hand runs, everything once it is over.
    pub fn sanitize_state(&self, viewer: &str) -> HandView {
        let players = self
            .players
            .iter()
            .map(|player| {
                let mut player = player.clone();
                if !self.game_over && player.name != viewer {
                    player.hole_cards.clear();
                }
                player
            })
            .collect();

        HandView {
            community_cards: self.community_cards.clone(),
            players,
            round: self.round,
            current_player: self.current_player,
            current_bet: self.current_bet,
            pot: self.pot,
            started: self.started,
            game_over: self.game_over,
            winner: self.winner.clone(),
            best_rank: self.best_rank.clone(),
            best_hand: self.best_hand.clone(),
        }
    }

    /// Takes `name` out of the running hand. If it was their turn the seat is
    /// auto-folded and [`DisconnectOutcome::OwnTurn`] is returned.
    pub fn disconnect(&mut self, name: &str) -> Result<DisconnectOutcome, GameError> {
        let idx = self.seat_of(name).ok_or(GameError::PlayerNotInHand)?;
        if !self.started || self.game_over || !self.players[idx].active {
            return Ok(DisconnectOutcome::Unchanged);
        }

        if idx == self.current_player {
            // A fold that closes the round can still fail on the next blinds.
            // The seat is gone either way, so take it out and pass the turn on.
            if self.advance_state(name, Action::Fold).is_err() {
                self.fold_out(idx);
                if !self.game_over
                    && let (Some(next), _) = self.get_next_player(idx)
                {
                    self.current_player = next;
                }
            }
            return Ok(DisconnectOutcome::OwnTurn);
        }

        self.fold_out(idx);
        Ok(DisconnectOutcome::Folded)
    }

    /// Marks the seat folded without touching the turn pointer, ending the
    /// hand if that leaves fewer than two seats in it.
    fn fold_out(&mut self, idx: usize) {
        let player = &mut self.players[idx];
        player.active = false;
        player.last_action = Some(Action::Fold);
        match self.active_count() {
            0 => {
                self.game_over = true;
                self.winner = None;
                self.best_rank = Some(NO_ONE_WON.to_string());
            }
            1 => self.finish_last_man_standing(),
            _ => {}
        }
    }

    pub fn should_be_disbanded(&self) -> bool {
        self.game_over || (self.started && self.players.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::Suit;

    const P0: &str = "Player 0";
    const P1: &str = "Player 1";
    const P2: &str = "Player 2";

    fn seated(stacks: &[i64]) -> TexasHoldem {
        let mut game = TexasHoldem::new();
        for (i, stack) in stacks.iter().enumerate() {
            game.add_player(&format!("Player {i}"), *stack).unwrap();
        }
        game
    }

    fn started() -> TexasHoldem {
        let mut game = seated(&[100, 100, 100]);
        game.start_game().unwrap();
        game
    }

    fn play(game: &mut TexasHoldem, moves: &[(&str, Action)]) -> Result<(), GameError> {
        for (name, action) in moves {
            game.advance_state(name, *action)?;
        }
        Ok(())
    }

    const THREE_CALLS: [(&str, Action); 3] =
        [(P0, Action::Call), (P1, Action::Call), (P2, Action::Call)];

    fn chips_in_play(game: &TexasHoldem) -> Chips {
        game.players().iter().map(|p| p.stack).sum::<Chips>() + game.pot()
    }

    /// P1 is left with nothing after the flop blinds, so the next round
    /// can't open. P2 is to act on the flop.
    fn short_stack_on_flop() -> TexasHoldem {
        let mut game = seated(&[100, 3, 100]);
        game.start_game().unwrap();
        play(&mut game, &THREE_CALLS).unwrap();
        play(&mut game, &[(P0, Action::Check), (P1, Action::Check)]).unwrap();
        assert_eq!(game.players()[1].stack, 0);
        assert_eq!(game.current_player(), 2);
        game
    }

    fn stacked(cards: &str) -> Deck {
        Deck::stacked(
            cards
                .split_whitespace()
                .map(|c| c.parse().unwrap())
                .collect(),
        )
    }

    #[test]
    fn test_add_player_is_idempotent() {
        let mut game = TexasHoldem::new();
        game.add_player("alice", 100).unwrap();
        game.add_player("alice", 100).unwrap();
        assert_eq!(game.players().len(), 1);
    }

    #[test]
    fn test_add_player_rejects_negative_stack() {
        let mut game = TexasHoldem::new();
        assert_eq!(game.add_player("alice", -1), Err(GameError::InvalidStack(-1)));
        assert!(game.players().is_empty());
    }

    #[test]
    fn test_add_player_caps_roster() {
        let mut game = TexasHoldem::new();
        for i in 0..MAX_PLAYERS {
            game.add_player(&format!("p{i}"), 100).unwrap();
        }
        assert_eq!(game.add_player("late", 100), Err(GameError::TableFull));
    }

    #[test]
    fn test_add_player_after_start() {
        let mut game = started();
        assert_eq!(game.add_player("late", 100), Err(GameError::AlreadyStarted));
        assert_eq!(game.add_player(P1, 100), Ok(()));
        assert_eq!(game.players().len(), 3);
    }

    #[test]
    fn test_start_game_needs_three_players() {
        let mut game = seated(&[100, 100]);
        assert_eq!(game.start_game(), Err(GameError::NotEnoughPlayers));
        assert!(!game.is_started());
    }

    #[test]
    fn test_start_game_posts_blinds() {
        let game = started();
        assert_eq!(game.pot(), 3);
        assert_eq!(game.current_bet(), 2);
        assert_eq!(game.round(), Round::PreFlop);
        assert_eq!(game.current_player(), 0);

        let stacks: Vec<_> = game.players().iter().map(|p| p.stack).collect();
        assert_eq!(stacks, vec![100, 99, 98]);
        let bets: Vec<_> = game.players().iter().map(|p| p.bet).collect();
        assert_eq!(bets, vec![0, 1, 2]);
        for player in game.players() {
            assert!(player.active);
            assert_eq!(player.hole_cards.len(), 2);
        }
    }

    #[test]
    fn test_start_game_twice() {
        let mut game = started();
        assert_eq!(game.start_game(), Err(GameError::AlreadyStarted));
    }

    #[test]
    fn test_start_game_insufficient_blind_changes_nothing() {
        let mut game = seated(&[100, 100, 1]);
        let before = game.clone();
        assert_eq!(
            game.start_game(),
            Err(GameError::InsufficientFunds {
                required: 2,
                available: 1
            })
        );
        assert_eq!(game, before);
    }

    #[test]
    fn test_wrong_turn_changes_nothing() {
        let mut game = started();
        let before = game.clone();
        assert_eq!(game.advance_state(P1, Action::Call), Err(GameError::WrongTurn));
        assert_eq!(game.advance_state(P2, Action::Fold), Err(GameError::WrongTurn));
        assert_eq!(game, before);

        game.advance_state(P0, Action::Call).unwrap();
        let before = game.clone();
        assert_eq!(game.advance_state(P0, Action::Call), Err(GameError::WrongTurn));
        assert_eq!(game, before);
    }

    #[test]
    fn test_unknown_player() {
        let mut game = started();
        assert_eq!(
            game.advance_state("nobody", Action::Call),
            Err(GameError::PlayerNotInHand)
        );
    }

    #[test]
    fn test_action_before_start() {
        let mut game = seated(&[100, 100]);
        assert_eq!(
            game.advance_state(P0, Action::Call),
            Err(GameError::NotEnoughPlayers)
        );

        let mut game = seated(&[100, 100, 100]);
        // Seats only become active once cards are dealt.
        assert_eq!(
            game.advance_state(P0, Action::Call),
            Err(GameError::InvalidAction)
        );
    }

    #[test]
    fn test_check_illegal_preflop() {
        let mut game = started();
        assert_eq!(game.advance_state(P0, Action::Check), Err(GameError::InvalidAction));
    }

    #[test]
    fn test_check_requires_earlier_checks() {
        let mut game = started();
        play(&mut game, &THREE_CALLS).unwrap();
        assert_eq!(game.round(), Round::Flop);

        game.advance_state(P0, Action::Call).unwrap();
        let before = game.clone();
        assert_eq!(game.advance_state(P1, Action::Check), Err(GameError::InvalidAction));
        assert_eq!(game, before);
    }

    #[test]
    fn test_round_of_checks_advances() {
        let mut game = started();
        play(&mut game, &THREE_CALLS).unwrap();
        play(
            &mut game,
            &[(P0, Action::Check), (P1, Action::Check), (P2, Action::Check)],
        )
        .unwrap();
        assert_eq!(game.round(), Round::Turn);
        assert_eq!(game.community_cards().len(), 4);
    }

    #[test]
    fn test_full_hand_of_calls() {
        let mut game = started();

        play(&mut game, &THREE_CALLS).unwrap();
        assert_eq!(game.round(), Round::Flop);
        assert_eq!(game.community_cards().len(), 3);

        play(&mut game, &THREE_CALLS).unwrap();
        assert_eq!(game.round(), Round::Turn);
        assert_eq!(game.community_cards().len(), 4);

        play(&mut game, &THREE_CALLS).unwrap();
        assert_eq!(game.round(), Round::River);
        assert_eq!(game.community_cards().len(), 5);

        play(&mut game, &THREE_CALLS).unwrap();
        assert!(game.is_game_over());
        assert!(game.winner().is_some());
        assert_eq!(game.best_hand().len(), 5);
        assert!(game.should_be_disbanded());
    }

    #[test]
    fn test_new_round_posts_blinds_into_pot() {
        let mut game = started();
        play(&mut game, &THREE_CALLS).unwrap();

        // 3 blinds + 2 + 1 to call preflop, then 3 more for the flop blinds.
        assert_eq!(game.pot(), 9);
        assert_eq!(game.current_bet(), 2);
        let bets: Vec<_> = game.players().iter().map(|p| p.bet).collect();
        assert_eq!(bets, vec![0, 1, 2]);
        assert!(game.players().iter().all(|p| p.last_action.is_none()));
        assert_eq!(chips_in_play(&game), 300);
    }

    #[test]
    fn test_new_round_blind_shortfall_rejects_closing_action() {
        let mut game = short_stack_on_flop();
        let before = game.clone();

        assert_eq!(
            game.advance_state(P2, Action::Check),
            Err(GameError::InsufficientFunds {
                required: 1,
                available: 0
            })
        );
        assert_eq!(game, before);
        assert_eq!(game.round(), Round::Flop);
    }

    #[test]
    fn test_chips_are_conserved() {
        let mut game = started();
        let moves = [
            (P0, Action::Raise),
            (P1, Action::Call),
            (P2, Action::Raise),
            (P0, Action::Call),
            (P1, Action::Call),
            (P2, Action::Call),
        ];
        for (name, action) in moves {
            game.advance_state(name, action).unwrap();
            assert_eq!(chips_in_play(&game), 300);
        }
    }

    #[test]
    fn test_raise_lifts_current_bet() {
        let mut game = started();
        game.advance_state(P0, Action::Raise).unwrap();
        assert_eq!(game.current_bet(), 4);
        assert_eq!(game.pot(), 7);
        assert_eq!(game.players()[0].stack, 96);

        game.advance_state(P1, Action::Call).unwrap();
        assert_eq!(game.players()[1].stack, 96);
        assert_eq!(game.players()[1].bet, 4);
        assert_eq!(game.pot(), 10);
    }

    #[test]
    fn test_insufficient_funds_changes_nothing() {
        let mut game = seated(&[100, 100, 3]);
        game.start_game().unwrap();
        play(&mut game, &[(P0, Action::Raise), (P1, Action::Call)]).unwrap();

        let before = game.clone();
        assert_eq!(
            game.advance_state(P2, Action::Call),
            Err(GameError::InsufficientFunds {
                required: 4,
                available: 1
            })
        );
        assert_eq!(game, before);
    }

    #[test]
    fn test_fold_out_of_turn_rejected() {
        let mut game = started();
        let moves = [
            (P0, Action::Fold),
            (P1, Action::Call),
            (P2, Action::Call),
            (P0, Action::Call),
        ];
        assert_eq!(play(&mut game, &moves), Err(GameError::WrongTurn));
    }

    #[test]
    fn test_last_man_standing_after_call_and_folds() {
        let mut game = started();
        play(&mut game, &[(P0, Action::Call), (P1, Action::Fold), (P2, Action::Fold)]).unwrap();
        assert!(game.is_game_over());
        assert_eq!(game.winner().unwrap(), P0);
        assert_eq!(game.best_rank(), Some(LAST_MAN_STANDING));
        assert!(game.community_cards().is_empty());
    }

    #[test]
    fn test_last_man_standing_is_immediate() {
        let mut game = started();
        play(&mut game, &[(P0, Action::Fold), (P1, Action::Fold)]).unwrap();
        assert!(game.is_game_over());
        assert_eq!(game.winner().unwrap(), P2);
        assert_eq!(game.best_rank(), Some(LAST_MAN_STANDING));
        assert_eq!(game.round(), Round::PreFlop);
    }

    #[test]
    fn test_no_actions_after_game_over() {
        let mut game = started();
        play(&mut game, &[(P0, Action::Call), (P1, Action::Fold), (P2, Action::Fold)]).unwrap();
        let before = game.clone();
        assert!(game.advance_state(P0, Action::Call).is_err());
        assert_eq!(game, before);
    }

    #[test]
    fn test_showdown_four_of_a_kind() {
        // Hole cards are dealt seat by seat, then flop, turn and river.
        let deck = stacked("Qd Qc 2h 2s 3h 3s Qs Qh Ts 9s 8s");
        let mut game = TexasHoldem::with_deck(deck);
        for name in [P0, P1, P2] {
            game.add_player(name, 100).unwrap();
        }
        game.start_game().unwrap();
        for _ in 0..4 {
            play(&mut game, &THREE_CALLS).unwrap();
        }

        assert!(game.is_game_over());
        assert_eq!(game.winner().unwrap(), P0);
        assert_eq!(game.best_rank(), Some("Four of a Kind"));
        assert_eq!(game.best_hand().iter().filter(|c| c.0 == 12).count(), 4);
    }

    #[test]
    fn test_showdown_full_house() {
        let deck = stacked("2h 3s 2d 2c 3h 4s Qs Qh Qc 9s 8d");
        let mut game = TexasHoldem::with_deck(deck);
        for name in [P0, P1, P2] {
            game.add_player(name, 100).unwrap();
        }
        game.start_game().unwrap();
        for _ in 0..4 {
            play(&mut game, &THREE_CALLS).unwrap();
        }

        assert_eq!(game.winner().unwrap(), P1);
        assert_eq!(game.best_rank(), Some("Full House"));
    }

    #[test]
    fn test_showdown_tie_goes_to_first_seat() {
        // Board plays for everyone.
        let deck = stacked("2c 3d 2d 3h 2h 3s As Ks Qs Js Ts");
        let mut game = TexasHoldem::with_deck(deck);
        for name in [P0, P1, P2] {
            game.add_player(name, 100).unwrap();
        }
        game.start_game().unwrap();
        for _ in 0..4 {
            play(&mut game, &THREE_CALLS).unwrap();
        }

        assert_eq!(game.winner().unwrap(), P0);
        assert_eq!(game.best_rank(), Some("Straight Flush"));
    }

    #[test]
    fn test_deck_exhaustion_is_fatal_and_atomic() {
        let deck = Deck::stacked(vec![
            Card(2, Suit::Club),
            Card(3, Suit::Club),
            Card(4, Suit::Club),
            Card(5, Suit::Club),
            Card(6, Suit::Club),
            Card(7, Suit::Club),
        ]);
        let mut game = TexasHoldem::with_deck(deck);
        for name in [P0, P1, P2] {
            game.add_player(name, 100).unwrap();
        }
        game.start_game().unwrap();
        play(&mut game, &THREE_CALLS[..2]).unwrap();

        let before = game.clone();
        assert_eq!(
            game.advance_state(P2, Action::Call),
            Err(GameError::DeckExhausted)
        );
        assert_eq!(game, before);
    }

    #[test]
    fn test_get_next_player() {
        let mut game = started();
        assert_eq!(game.get_next_player(0), (Some(1), false));
        assert_eq!(game.get_next_player(1), (Some(2), false));
        assert_eq!(game.get_next_player(2), (Some(0), true));

        game.advance_state(P0, Action::Fold).unwrap();
        assert_eq!(game.get_next_player(2), (Some(1), true));
    }

    #[test]
    fn test_sanitize_state_hides_other_hands() {
        let game = started();
        for (viewer_idx, viewer) in [P0, P1, P2].iter().enumerate() {
            let view = game.sanitize_state(viewer);
            for (i, player) in view.players.iter().enumerate() {
                if i == viewer_idx {
                    assert_eq!(player.hole_cards.len(), 2);
                } else {
                    assert!(player.hole_cards.is_empty());
                }
            }
        }
    }

    #[test]
    fn test_sanitize_state_reveals_at_game_over() {
        let mut game = started();
        for _ in 0..4 {
            play(&mut game, &THREE_CALLS).unwrap();
        }
        let view = game.sanitize_state(P0);
        assert!(view.game_over);
        assert!(view.players.iter().all(|p| p.hole_cards.len() == 2));
    }

    #[test]
    fn test_disconnect_on_own_turn_folds() {
        let mut game = started();
        assert_eq!(game.disconnect(P0), Ok(DisconnectOutcome::OwnTurn));
        assert!(!game.players()[0].active);
        assert_eq!(game.players()[0].last_action, Some(Action::Fold));
        assert_eq!(game.current_player(), 1);
    }

    #[test]
    fn test_disconnect_on_own_turn_when_fold_cannot_close_round() {
        let mut game = short_stack_on_flop();

        assert_eq!(game.disconnect(P2), Ok(DisconnectOutcome::OwnTurn));
        assert!(!game.players()[2].active);
        assert_eq!(game.players()[2].last_action, Some(Action::Fold));
        assert_eq!(game.current_player(), 0);
        assert_eq!(game.round(), Round::Flop);
        assert_eq!(game.community_cards().len(), 3);
        assert!(!game.is_game_over());
        assert_eq!(chips_in_play(&game), 203);
    }

    #[test]
    fn test_disconnect_out_of_turn_folds() {
        let mut game = started();
        assert_eq!(game.disconnect(P2), Ok(DisconnectOutcome::Folded));
        assert!(!game.players()[2].active);
        assert_eq!(game.current_player(), 0);
        assert!(!game.is_game_over());

        assert_eq!(game.disconnect(P1), Ok(DisconnectOutcome::Folded));
        assert!(game.is_game_over());
        assert_eq!(game.winner().unwrap(), P0);
        assert!(game.should_be_disbanded());
    }

    #[test]
    fn test_disconnect_before_start_keeps_seat() {
        let mut game = seated(&[100, 100]);
        assert_eq!(game.disconnect(P0), Ok(DisconnectOutcome::Unchanged));
        assert_eq!(game.players().len(), 2);
        assert!(!game.should_be_disbanded());
    }

    #[test]
    fn test_disconnect_unknown_player() {
        let mut game = started();
        assert_eq!(game.disconnect("nobody"), Err(GameError::PlayerNotInHand));
    }

    #[test]
    fn test_hand_view_serializes() {
        let game = started();
        let json = serde_json::to_value(game.sanitize_state(P0)).unwrap();
        assert_eq!(json["round"], "preflop");
        assert_eq!(json["pot"], 3);
        assert_eq!(json["current_bet"], 2);
        assert_eq!(json["players"].as_array().unwrap().len(), 3);
    }
}
