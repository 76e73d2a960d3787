//! Loopdeck CLI - Terminal practice player

mod browser;
mod cli;
mod input;
mod logging;
mod settings;
mod view;

use std::io::{ self, Stdout };
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{ Duration, Instant };

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{ self, Event, KeyCode, KeyEventKind },
    terminal::{ disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen },
    ExecutableCommand,
};
use ratatui::{
    layout::Alignment,
    prelude::*,
    widgets::{ Block, Borders, List, ListItem, ListState, Paragraph, Wrap },
};

use browser::FileBrowser;
use cli::Args;
use input::{ InputBuffer, InputMode };
use settings::Settings;
use view::ViewMode;

use loopdeck_core::{
    command,
    format::{ format_preset, format_rate, format_time },
    state::{ RATE_PRESETS, RATE_SLIDER_MAX, RATE_SLIDER_MIN },
    AudioElement, Command, ControllerError, PlayerController, PlayerEvent, Resource,
};


/// Application state.
struct App {
    player: PlayerController<AudioElement>,
    events: mpsc::Receiver<PlayerEvent>,
    should_quit: bool,

    // View state
    view_mode: ViewMode,
    browser: FileBrowser,
    help_scroll: u16,

    // Input state
    input_mode: InputMode,
    input_buffer: InputBuffer,

    // Status message (shown in status bar)
    status_message: Option<String>,
    status_clear_at: Option<Instant>,

    settings: Settings,

    /// Loop window from the command line, applied once the duration is known
    pending_loop: Option<( f64, f64 )>,
}


impl App {
    fn new( args: &Args, settings: Settings ) -> Result<Self> {
        let element = AudioElement::with_notify_interval( settings.notify_interval() );
        let mut player = PlayerController::new( element );
        let events = player.watch();

        if let Some( rate ) = args.rate {
            player.set_playback_rate( rate )?;
        }
        if let Some( volume ) = args.volume {
            player.set_volume( volume as f64 / 100.0 )?;
        }

        let browser = match &args.path {
            Some( path ) => FileBrowser::new( path.clone() ).or_else( |e| {
                tracing::warn!( "Cannot browse {:?}: {}", path, e );
                FileBrowser::at_home()
            })?,
            None => FileBrowser::at_home()?,
        };

        let pending_loop = args.loop_window.as_deref().and_then( |bounds| match bounds {
            [ start, end ] => Some(( *start, *end )),
            _ => None,
        });

        let mut app = Self {
            player,
            events,
            should_quit: false,
            view_mode: ViewMode::Open,
            browser,
            help_scroll: 0,
            input_mode: InputMode::Normal,
            input_buffer: InputBuffer::new(),
            status_message: None,
            status_clear_at: None,
            settings,
            pending_loop,
        };

        if let Some( file ) = &args.file {
            app.open_file( file.clone() );
        }

        Ok( app )
    }


    /// Sets a status message that auto-clears after a delay.
    fn set_status( &mut self, msg: impl Into<String> ) {
        self.status_message = Some( msg.into() );
        self.status_clear_at = Some( Instant::now() + Duration::from_secs( 3 ) );
    }


    /// Applies element notifications and reacts to the resulting events.
    fn tick( &mut self ) {
        if let Some( clear_at ) = self.status_clear_at {
            if Instant::now() >= clear_at {
                self.status_message = None;
                self.status_clear_at = None;
            }
        }

        self.player.pump();

        while let Ok( event ) = self.events.try_recv() {
            self.handle_event( event );
        }
    }


    fn handle_event( &mut self, event: PlayerEvent ) {
        match event {
            PlayerEvent::DurationKnown { duration } => {
                if let Some(( start, end )) = self.pending_loop.take() {
                    let result = self.player.set_loop_bounds( start, end.min( duration ) );
                    self.report( result );
                    if !self.player.state().is_looping {
                        self.player.toggle_loop();
                    }
                }
                self.set_status( format!( "Ready: {}", format_time( duration ) ) );
            }
            PlayerEvent::LoadFailed { message } => {
                self.set_status( format!( "Cannot play file: {}", message ) );
            }
            PlayerEvent::Ended => {
                self.set_status( "End of track" );
            }
            PlayerEvent::Error { message } => {
                self.set_status( format!( "Error: {}", message ) );
            }
            _ => {}
        }
    }


    /// Shows a controller error in the status bar.
    fn report( &mut self, result: Result<(), ControllerError> ) {
        if let Err( e ) = result {
            self.set_status( format!( "Error: {}", e ) );
        }
    }


    fn open_file( &mut self, path: PathBuf ) {
        match Resource::open( &path ) {
            Ok( resource ) => {
                self.set_status( format!( "Loading {}", resource.name() ) );
                self.player.load_source( resource );
                self.view_mode = ViewMode::Player;
            }
            Err( e ) => {
                tracing::warn!( "Cannot open {:?}: {}", path, e );
                self.set_status( e.to_string() );
            }
        }
    }


    /// Leaves a modal view for the player, or the picker if nothing is loaded.
    fn close_view( &mut self ) {
        self.view_mode = if self.player.state().has_source() {
            ViewMode::Player
        } else {
            ViewMode::Open
        };
        self.help_scroll = 0;
    }


    fn handle_key( &mut self, code: KeyCode ) {
        match self.input_mode {
            InputMode::Normal => self.handle_normal_key( code ),
            InputMode::Command => self.handle_command_key( code ),
        }
    }


    fn handle_normal_key( &mut self, code: KeyCode ) {
        // Global keys
        match code {
            KeyCode::Char( '/' ) => {
                self.input_mode = InputMode::Command;
                self.input_buffer.clear();
                return;
            }
            KeyCode::Char( '?' ) if self.view_mode != ViewMode::Help => {
                self.view_mode = ViewMode::Help;
                return;
            }
            _ => {}
        }

        match self.view_mode {
            ViewMode::Open => self.handle_browser_key( code ),
            ViewMode::Player => self.handle_player_key( code ),
            ViewMode::Help => self.handle_help_key( code ),
        }
    }


    fn handle_player_key( &mut self, code: KeyCode ) {
        let skip = self.settings.skip_seconds;
        let nudge = self.settings.nudge_seconds;
        let volume_step = self.settings.volume_step;

        let result = match code {
            KeyCode::Char( 'q' ) => {
                self.should_quit = true;
                Ok(())
            }
            KeyCode::Char( 'o' ) => {
                self.view_mode = ViewMode::Open;
                Ok(())
            }

            // Transport
            KeyCode::Char( ' ' ) => self.player.toggle_play_pause(),
            KeyCode::Left => self.player.skip_by( -skip ),
            KeyCode::Right => self.player.skip_by( skip ),
            KeyCode::Char( ',' ) => self.player.skip_by( -nudge ),
            KeyCode::Char( '.' ) => self.player.skip_by( nudge ),
            KeyCode::Home | KeyCode::Char( 'r' ) => self.player.reset_position(),

            // Volume
            KeyCode::Up => {
                let volume = self.player.state().volume + volume_step;
                self.player.set_volume( volume )
            }
            KeyCode::Down => {
                let volume = self.player.state().volume - volume_step;
                self.player.set_volume( volume )
            }

            // Speed
            KeyCode::Char( '+' ) | KeyCode::Char( '=' ) => self.player.step_playback_rate( 1 ),
            KeyCode::Char( '-' ) | KeyCode::Char( '_' ) => self.player.step_playback_rate( -1 ),
            KeyCode::Char( 'p' ) => self.player.cycle_preset( 1 ),
            KeyCode::Char( 'P' ) => self.player.cycle_preset( -1 ),

            // Loop
            KeyCode::Char( '[' ) => {
                self.player.capture_loop_start();
                Ok(())
            }
            KeyCode::Char( ']' ) => {
                self.player.capture_loop_end();
                Ok(())
            }
            KeyCode::Char( '{' ) => self.player.nudge_loop_start( -nudge ),
            KeyCode::Char( '}' ) => self.player.nudge_loop_start( nudge ),
            KeyCode::Char( '<' ) => self.player.nudge_loop_end( -nudge ),
            KeyCode::Char( '>' ) => self.player.nudge_loop_end( nudge ),
            KeyCode::Char( 'l' ) => {
                self.player.toggle_loop();
                let state = if self.player.state().is_looping { "on" } else { "off" };
                self.set_status( format!( "Loop {}", state ) );
                Ok(())
            }
            _ => Ok(()),
        };

        self.report( result );
    }


    fn handle_browser_key( &mut self, code: KeyCode ) {
        match code {
            KeyCode::Char( 'q' ) => {
                self.should_quit = true;
            }
            KeyCode::Esc => {
                if self.player.state().has_source() {
                    self.view_mode = ViewMode::Player;
                }
            }
            KeyCode::Up | KeyCode::Char( 'k' ) => {
                self.browser.select_previous();
            }
            KeyCode::Down | KeyCode::Char( 'j' ) => {
                self.browser.select_next();
            }
            KeyCode::Home | KeyCode::Char( 'g' ) => {
                self.browser.select_first();
            }
            KeyCode::End | KeyCode::Char( 'G' ) => {
                self.browser.select_last();
            }
            KeyCode::Enter => match self.browser.enter_selected() {
                Ok( Some( path ) ) => self.open_file( path ),
                Ok( None ) => {}
                Err( e ) => self.set_status( format!( "{:#}", e ) ),
            },
            KeyCode::Backspace => {
                if let Err( e ) = self.browser.go_up() {
                    self.set_status( format!( "{:#}", e ) );
                }
            }
            KeyCode::Char( '~' ) => {
                if let Some( home ) = dirs::home_dir() {
                    if let Err( e ) = self.browser.navigate_to( &home ) {
                        self.set_status( format!( "{:#}", e ) );
                    }
                }
            }
            _ => {}
        }
    }


    fn handle_help_key( &mut self, code: KeyCode ) {
        match code {
            KeyCode::Char( 'q' ) | KeyCode::Esc | KeyCode::Char( '?' ) => {
                self.close_view();
            }
            KeyCode::Up | KeyCode::Char( 'k' ) => {
                self.help_scroll = self.help_scroll.saturating_sub( 1 );
            }
            KeyCode::Down | KeyCode::Char( 'j' ) => {
                self.help_scroll = self.help_scroll.saturating_add( 1 );
            }
            KeyCode::PageUp => {
                self.help_scroll = self.help_scroll.saturating_sub( 10 );
            }
            KeyCode::PageDown => {
                self.help_scroll = self.help_scroll.saturating_add( 10 );
            }
            _ => {}
        }
    }


    fn handle_command_key( &mut self, code: KeyCode ) {
        match code {
            KeyCode::Enter => {
                let input = self.input_buffer.content().to_string();
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
                self.execute_command( &input );
            }
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
            }
            KeyCode::Backspace => {
                if self.input_buffer.is_empty() {
                    self.input_mode = InputMode::Normal;
                } else {
                    self.input_buffer.backspace();
                }
            }
            KeyCode::Delete => self.input_buffer.delete(),
            KeyCode::Left => self.input_buffer.move_left(),
            KeyCode::Right => self.input_buffer.move_right(),
            KeyCode::Home => self.input_buffer.move_home(),
            KeyCode::End => self.input_buffer.move_end(),
            KeyCode::Char( c ) => self.input_buffer.insert( c ),
            _ => {}
        }
    }


    fn execute_command( &mut self, input: &str ) {
        match Command::parse( input ) {
            Ok( cmd ) => {
                tracing::debug!( "Command: {:?}", cmd );
                if let Err( e ) = self.run_command( cmd ) {
                    self.set_status( format!( "Error: {}", e ) );
                }
            }
            Err( e ) => {
                self.set_status( format!( "{}", e ) );
            }
        }
    }


    fn run_command( &mut self, cmd: Command ) -> Result<()> {
        match cmd {
            Command::Open { path } => {
                if path.is_dir() {
                    self.browser.navigate_to( &path )?;
                    self.view_mode = ViewMode::Open;
                } else {
                    self.open_file( path );
                }
            }
            Command::Play => {
                if !self.player.state().is_playing {
                    self.player.toggle_play_pause()?;
                }
            }
            Command::Pause => {
                if self.player.state().is_playing {
                    self.player.toggle_play_pause()?;
                }
            }
            Command::Seek { position } => self.player.seek( position )?,
            Command::Skip { delta } => self.player.skip_by( delta )?,
            Command::Reset => self.player.reset_position()?,
            Command::Rate { rate } => {
                self.player.set_playback_rate( rate.unwrap_or( 1.0 ) )?;
                self.set_status( format!( "Speed: {}", format_rate( self.player.state().playback_rate ) ) );
            }
            Command::Volume { level } => {
                if let Some( level ) = level {
                    self.player.set_volume( level as f64 / 100.0 )?;
                }
                self.set_status( format!( "Volume: {}%", volume_percent( self.player.state().volume ) ) );
            }
            Command::Loop { bounds } => match bounds {
                Some(( start, end )) => {
                    self.player.set_loop_bounds( start, end )?;
                    if !self.player.state().is_looping {
                        self.player.toggle_loop();
                    }
                }
                None => self.player.toggle_loop(),
            },
            Command::LoopStart { at } => match at {
                Some( at ) => self.player.set_loop_start( at )?,
                None => self.player.capture_loop_start(),
            },
            Command::LoopEnd { at } => match at {
                Some( at ) => self.player.set_loop_end( at )?,
                None => self.player.capture_loop_end(),
            },
            Command::Help => {
                self.view_mode = ViewMode::Help;
            }
            Command::Quit => {
                self.should_quit = true;
            }
        }
        Ok(())
    }
}


fn main() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::load();

    let level = args.log_level.clone().unwrap_or_else( || settings.log_level.clone() );
    if let Err( e ) = logging::init( &level ) {
        eprintln!( "Logging disabled: {:#}", e );
    }
    tracing::info!( "Starting loopdeck {}", env!( "CARGO_PKG_VERSION" ) );

    // Create app before touching the terminal so startup errors print normally
    let mut app = App::new( &args, settings )?;

    // Setup terminal
    enable_raw_mode()?;
    io::stdout().execute( EnterAlternateScreen )?;

    let mut terminal = Terminal::new( CrosstermBackend::new( io::stdout() ) )?;
    let result = run( &mut terminal, &mut app );

    // Cleanup
    disable_raw_mode()?;
    io::stdout().execute( LeaveAlternateScreen )?;

    tracing::info!( "Exiting" );
    result
}


/// Main loop: apply notifications, draw, then wait up to 100ms for input.
fn run( terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App ) -> Result<()> {
    loop {
        app.tick();

        terminal.draw( |frame| draw_ui( frame, app ) )?;

        if event::poll( Duration::from_millis( 100 ) )? {
            if let Event::Key( key ) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key( key.code );
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}


/// Draws the main UI.
fn draw_ui( frame: &mut Frame, app: &mut App ) {
    let chunks = Layout::default()
        .direction( Direction::Vertical )
        .constraints([
            Constraint::Length( 2 ),  // Header
            Constraint::Min( 0 ),     // Main content
            Constraint::Length( 1 ),  // Status bar
        ])
        .split( frame.area() );

    let header = Paragraph::new( format!( "  LOOPDECK - {}", app.view_mode.title() ) )
        .style( Style::default().fg( Color::Cyan ).bold() )
        .block( Block::default().borders( Borders::BOTTOM ) );
    frame.render_widget( header, chunks[ 0 ] );

    match app.view_mode {
        ViewMode::Open => draw_browser( frame, app, chunks[ 1 ] ),
        ViewMode::Player => draw_player( frame, app, chunks[ 1 ] ),
        ViewMode::Help => draw_help( frame, app, chunks[ 1 ] ),
    }

    draw_status_bar( frame, app, chunks[ 2 ] );
}


fn draw_browser( frame: &mut Frame, app: &App, area: Rect ) {
    let path_str = app.browser.current_dir().display().to_string();
    let title = if path_str.chars().count() > 50 {
        let tail: String = path_str.chars().rev().take( 47 ).collect::<Vec<_>>().into_iter().rev().collect();
        format!( " ...{} ", tail )
    } else {
        format!( " {} ", path_str )
    };

    let items: Vec<ListItem> = app.browser.entries()
        .iter()
        .map( |entry| {
            let ( icon, style ) = if entry.is_dir {
                ( "▸", Style::default().fg( Color::Blue ) )
            } else {
                ( "♪", Style::default().fg( Color::Green ) )
            };
            ListItem::new( format!( " {} {}", icon, entry.name ) ).style( style )
        })
        .collect();

    let mut state = ListState::default();
    state.select( Some( app.browser.selected_index() ) );

    let browser_widget = List::new( items )
        .block( Block::default().title( title ).borders( Borders::ALL ) )
        .highlight_style( Style::default().bg( Color::DarkGray ) )
        .highlight_symbol( ">> " );

    frame.render_stateful_widget( browser_widget, area, &mut state );
}


fn draw_player( frame: &mut Frame, app: &App, area: Rect ) {
    if !app.player.state().has_source() {
        let empty = Paragraph::new( "No audio loaded. Press o to choose a file." )
            .alignment( Alignment::Center )
            .block( Block::default().borders( Borders::ALL ) );
        frame.render_widget( empty, area );
        return;
    }

    let columns = Layout::default()
        .direction( Direction::Horizontal )
        .constraints([ Constraint::Percentage( 67 ), Constraint::Percentage( 33 ) ])
        .split( area );
    let left = Layout::default()
        .direction( Direction::Vertical )
        .constraints([ Constraint::Length( 6 ), Constraint::Min( 0 ) ])
        .split( columns[ 0 ] );

    draw_transport( frame, app, left[ 0 ] );
    draw_speed( frame, app, left[ 1 ] );
    draw_loop( frame, app, columns[ 1 ] );
}


fn draw_transport( frame: &mut Frame, app: &App, area: Rect ) {
    let state = app.player.state();
    let name = state.source_name().unwrap_or( "Unknown" );

    let icon = if state.is_playing { "▶" } else { "⏸" };
    let badge = match ( &state.load_error, state.duration > 0.0 ) {
        ( Some( _ ), _ ) => Span::styled( " Error ", Style::default().fg( Color::Black ).bg( Color::Red ) ),
        ( None, true ) => Span::styled( " Loaded ", Style::default().fg( Color::Black ).bg( Color::Green ) ),
        ( None, false ) => Span::styled( " Loading ", Style::default().fg( Color::Black ).bg( Color::Yellow ) ),
    };

    let bar_width = ( area.width as usize ).saturating_sub( 20 ).max( 10 );
    let mut lines = vec![
        Line::from( vec![
            Span::styled( format!( " {} {}  ", icon, name ), Style::default().bold() ),
            badge,
        ]),
        Line::from( format!(
            " {} {} / {}",
            progress_bar( state.progress_percent(), bar_width ),
            format_time( state.current_time ),
            format_time( state.duration ),
        )),
        Line::from( Span::styled(
            format!( " Volume {}%", volume_percent( state.volume ) ),
            Style::default().fg( Color::Gray ),
        )),
    ];

    if let Some( error ) = &state.load_error {
        lines.push( Line::from( Span::styled( format!( " {}", error ), Style::default().fg( Color::Red ) ) ) );
    }

    let card = Paragraph::new( lines )
        .block( Block::default().title( " Player " ).borders( Borders::ALL ) );
    frame.render_widget( card, area );
}


fn draw_speed( frame: &mut Frame, app: &App, area: Rect ) {
    let state = app.player.state();
    let active = state.active_preset();

    let presets: Vec<Span> = RATE_PRESETS
        .iter()
        .enumerate()
        .map( |( i, preset )| {
            let style = if active == Some( i ) {
                Style::default().fg( Color::Black ).bg( Color::Yellow ).bold()
            } else {
                Style::default().fg( Color::Gray )
            };
            Span::styled( format!( " {} ", format_preset( *preset ) ), style )
        })
        .collect();

    let slider_width = ( area.width as usize ).saturating_sub( 16 ).max( 10 );
    let lines = vec![
        Line::from( Span::styled( format!( " Speed {}", format_rate( state.playback_rate ) ), Style::default().bold() ) ),
        Line::from( format!(
            " {} {} {}",
            format_preset( RATE_SLIDER_MIN ),
            slider( state.playback_rate, RATE_SLIDER_MIN, RATE_SLIDER_MAX, slider_width ),
            format_preset( RATE_SLIDER_MAX ),
        )),
        Line::from( "" ),
        Line::from( presets ),
        Line::from( "" ),
        Line::from( Span::styled( " [+/-] step  [p/P] next/prev preset", Style::default().fg( Color::DarkGray ) ) ),
    ];

    let card = Paragraph::new( lines )
        .wrap( Wrap { trim: false } )
        .block( Block::default().title( " Speed " ).borders( Borders::ALL ) );
    frame.render_widget( card, area );
}


fn draw_loop( frame: &mut Frame, app: &App, area: Rect ) {
    let state = app.player.state();

    let badge = if state.is_looping {
        Span::styled( " Active ", Style::default().fg( Color::Black ).bg( Color::Green ).bold() )
    } else {
        Span::styled( " Off ", Style::default().fg( Color::DarkGray ) )
    };
    let hint = Style::default().fg( Color::DarkGray );

    let lines = vec![
        Line::from( vec![ Span::raw( " A/B Loop  " ), badge ] ),
        Line::from( "" ),
        Line::from( format!( " Start  {}", format_time( state.loop_start ) ) ),
        Line::from( format!( " End    {}", format_time( state.loop_end ) ) ),
        Line::from( "" ),
        Line::from( Span::styled( " [ / ]   set start / end", hint ) ),
        Line::from( Span::styled( " { / }   nudge start", hint ) ),
        Line::from( Span::styled( " < / >   nudge end", hint ) ),
        Line::from( Span::styled( " l       toggle loop", hint ) ),
    ];

    let border = if state.is_looping {
        Style::default().fg( Color::Green )
    } else {
        Style::default()
    };
    let card = Paragraph::new( lines )
        .block( Block::default().title( " Loop " ).borders( Borders::ALL ).border_style( border ) );
    frame.render_widget( card, area );
}


fn draw_help( frame: &mut Frame, app: &mut App, area: Rect ) {
    let help_text = command::help_text();
    let line_count = help_text.lines().count() as u16;
    let visible_height = area.height.saturating_sub( 2 );

    let max_scroll = line_count.saturating_sub( visible_height );
    if app.help_scroll > max_scroll {
        app.help_scroll = max_scroll;
    }

    let help = Paragraph::new( help_text )
        .block( Block::default()
            .title( " Help (↑↓ scroll, ? or Esc to close) " )
            .borders( Borders::ALL )
        )
        .wrap( Wrap { trim: false } )
        .scroll(( app.help_scroll, 0 ));

    frame.render_widget( help, area );
}


fn draw_status_bar( frame: &mut Frame, app: &App, area: Rect ) {
    let ( text, style ) = match app.input_mode {
        InputMode::Command => {
            ( format!( "/{}", app.input_buffer.content() ), Style::default().fg( Color::Yellow ) )
        }
        InputMode::Normal => match &app.status_message {
            Some( msg ) => ( msg.clone(), Style::default().fg( Color::Green ) ),
            None => ( app.view_mode.hint().to_string(), Style::default().fg( Color::DarkGray ) ),
        },
    };

    frame.render_widget( Paragraph::new( text ).style( style ), area );

    if app.input_mode == InputMode::Command {
        let cursor_x = area.x + 1 + app.input_buffer.cursor_char_pos() as u16;
        frame.set_cursor_position(( cursor_x, area.y ));
    }
}


/// Renders a progress bar like `[████░░░░]` for a 0-100 percentage.
fn progress_bar( percent: f64, width: usize ) -> String {
    let filled = ( ( percent / 100.0 ).clamp( 0.0, 1.0 ) * width as f64 ).round() as usize;
    format!( "[{}{}]", "█".repeat( filled ), "░".repeat( width - filled ) )
}


/// Renders a slider track with a knob at `value`.
fn slider( value: f64, min: f64, max: f64, width: usize ) -> String {
    if width == 0 {
        return String::new();
    }
    let fraction = ( ( value - min ) / ( max - min ) ).clamp( 0.0, 1.0 );
    let knob = ( fraction * ( width - 1 ) as f64 ).round() as usize;
    ( 0..width ).map( |i| if i == knob { '●' } else { '─' } ).collect()
}


fn volume_percent( volume: f64 ) -> u32 {
    ( volume * 100.0 ).round() as u32
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_progress_bar() {
        assert_eq!( progress_bar( 0.0, 4 ), "[░░░░]" );
        assert_eq!( progress_bar( 50.0, 4 ), "[██░░]" );
        assert_eq!( progress_bar( 250.0, 4 ), "[████]" );
    }


    #[test]
    fn test_slider_knob_position() {
        assert_eq!( slider( 0.2, 0.2, 1.8, 5 ), "●────" );
        assert_eq!( slider( 1.0, 0.2, 1.8, 5 ), "──●──" );
        assert_eq!( slider( 3.0, 0.2, 1.8, 5 ), "────●" );
    }


    #[test]
    fn test_volume_percent_rounds() {
        assert_eq!( volume_percent( 0.35 ), 35 );
        assert_eq!( volume_percent( 1.0 ), 100 );
    }
}
