use std::process::ExitCode;

use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use itinerary_engine::access::Member;
use itinerary_engine::api::{ApiClient, ApiConfig, DEFAULT_BASE_URL, ItineraryApi, MockApi};
use itinerary_engine::budget::BudgetSummary;
use itinerary_engine::cache::{CachedRouteFinder, RouteCacheConfig};
use itinerary_engine::domain::{ItinerarySummary, UserId};
use itinerary_engine::editor::ItineraryEditor;
use itinerary_engine::map::{Projection, render_popup};
use itinerary_engine::session::{Session, TokenStore, TokenStoreConfig};
use itinerary_engine::transport::{
    RouteFinder, RouteSearch, SearchState, TransportMatcher, day_endpoints,
};

const USAGE: &str = "usage: itinerary-engine <itinerary-id> | login <token> | logout";

/// Everything shown for one itinerary.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    itinerary: ItinerarySummary,
    role: itinerary_engine::access::Role,
    members: Vec<Member>,
    budget: Option<BudgetSummary>,
    map: Projection,
    popups: Vec<String>,
    transport: Vec<SearchState>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(std::env::args().skip(1).collect()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let token_file = std::env::var("ITINERARY_TOKEN_FILE").unwrap_or_else(|_| {
        eprintln!("Warning: ITINERARY_TOKEN_FILE not set. Using the default token file.");
        TokenStoreConfig::default().path.display().to_string()
    });
    let store = TokenStore::new(TokenStoreConfig::new(token_file));

    let id = match args.as_slice() {
        [cmd, token] if cmd == "login" => {
            let session = Session::login(token.as_str(), &store)?;
            info!(user = %session.user_id(), "logged in");
            return Ok(());
        }
        [cmd] if cmd == "logout" => {
            if let Some(session) = Session::init(&store) {
                session.logout(&store)?;
            }
            info!("logged out");
            return Ok(());
        }
        [id] => id.clone(),
        _ => return Err(USAGE.into()),
    };

    let session = Session::init(&store);
    if session.is_none() {
        warn!("no saved session; only public itineraries are readable");
    }
    let user = session.as_ref().map(|s| s.user_id().clone());

    // Serve fixtures instead of the backend when a mock directory is given
    if let Ok(dir) = std::env::var("ITINERARY_MOCK_DIR") {
        info!(%dir, "using mock backend");
        let api = MockApi::from_dir(&dir, user.clone())?;
        let finder = CachedRouteFinder::new(api.clone(), &RouteCacheConfig::default());
        return print_report(&api, &finder, user, &id).await;
    }

    let base_url = std::env::var("ITINERARY_API_URL").unwrap_or_else(|_| {
        eprintln!("Warning: ITINERARY_API_URL not set. Using {DEFAULT_BASE_URL}.");
        DEFAULT_BASE_URL.to_string()
    });

    let mut config = ApiConfig::new(base_url);
    if let Some(session) = &session {
        config = config.with_token(session.token());
    }
    if let Ok(secs) = std::env::var("ITINERARY_API_TIMEOUT_SECS") {
        match secs.parse() {
            Ok(secs) => config = config.with_timeout(secs),
            Err(_) => eprintln!("Warning: ITINERARY_API_TIMEOUT_SECS is not a number, ignoring."),
        }
    }

    let api = ApiClient::new(config)?;
    let finder = CachedRouteFinder::new(api.clone(), &RouteCacheConfig::default());
    print_report(&api, &finder, user, &id).await
}

async fn print_report<A: ItineraryApi, F: RouteFinder>(
    api: &A,
    finder: &F,
    user: Option<UserId>,
    id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let editor = ItineraryEditor::load(api, user, id).await?;
    let itinerary = editor.itinerary();

    // One route search per day with a travel segment, all in flight at once
    let matcher = TransportMatcher::new(finder);
    let segments: Vec<_> = itinerary.days.iter().map(day_endpoints).collect();
    let mut searches: Vec<RouteSearch> = segments.iter().map(|_| RouteSearch::new()).collect();
    join_all(
        searches
            .iter_mut()
            .zip(&segments)
            .filter_map(|(search, segment)| {
                let (origin, destination) = segment.as_ref()?;
                Some(search.run(&matcher, origin, destination))
            }),
    )
    .await;

    let map = editor.projection(None);
    let popups = map
        .view()
        .map(|view| {
            view.markers
                .iter()
                .map(|m| render_popup(&m.popup))
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?
        .unwrap_or_default();

    let report = Report {
        itinerary: ItinerarySummary::from(itinerary),
        role: editor.role(),
        members: editor.members(),
        budget: editor.summary(),
        map,
        popups,
        transport: searches.iter().map(|s| s.state().clone()).collect(),
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
