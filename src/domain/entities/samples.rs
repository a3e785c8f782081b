//! Built-in records shown when the remote service is empty or unreachable.

use chrono::{DateTime, TimeZone, Utc};

use crate::entities::{output::Output, slider::SliderItem};

fn archived_at() -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single()
}

#[allow(clippy::too_many_arguments)]
fn sample_output(
    id: i64,
    title: &str,
    description: &str,
    photo: &str,
    category: &str,
    author: &str,
    workshop: &str,
    project: &str,
) -> Output {
    Output {
        id,
        created_at: archived_at(),
        title: title.to_string(),
        description: Some(description.to_string()),
        image_url: format!("https://images.unsplash.com/{photo}?auto=format&fit=crop&w=800&q=80"),
        process_image_url: None,
        category: Some(category.to_string()),
        author: Some(author.to_string()),
        workshop_name: Some(workshop.to_string()),
        project_name: Some(project.to_string()),
        date: None,
        link_url: Some(String::new()),
        is_featured: false,
    }
}

pub fn sample_outputs() -> Vec<Output> {
    vec![
        sample_output(
            1, "Hot Summer Sale",
            "A vibrant poster design for the summer season sales event.",
            "photo-1555041469-a586c61ea9bc", "Poster", "Yesung Jin",
            "2025 A-Hand Workshop", "Identity Design",
        ),
        sample_output(
            2, "Abstract Harmony",
            "An exploration of shapes and colors in modern composition.",
            "photo-1550684848-fac1c5b4e853", "Art", "John Doe",
            "Creative Coding", "Visual Experiments",
        ),
        sample_output(
            3, "Typography Series",
            "Experimental typography showing the flexibility of fonts.",
            "photo-1561070791-2526d30994b5", "Typography", "Alice Smith",
            "Type Masters", "Letterform Study",
        ),
        sample_output(
            4, "Neon Nights",
            "Cyberpunk inspired digital art piece.",
            "photo-1555041469-a586c61ea9bc", "Digital Art", "Bob Wilson",
            "Digital Future", "Cyber Aesthetics",
        ),
        sample_output(
            5, "Minimalist Chair",
            "Product design concept for modern living spaces.",
            "photo-1592078615290-033ee584e267", "Product", "Sarah Lee",
            "Industrial Design", "Furniture 2025",
        ),
    ]
}

pub fn sample_output_by_id(id: i64) -> Option<Output> {
    sample_outputs().into_iter().find(|output| output.id == id)
}

pub fn sample_slides() -> Vec<SliderItem> {
    let slides = [
        ("photo-1618005182384-a83a8bd57fbe", 2564, "Workroom Exhibition", "/board"),
        ("photo-1542038784456-1ea8e935640e", 2670, "Photography Series", "/output"),
        ("photo-1550684848-fac1c5b4e853", 2670, "Modern Typography", "/history"),
        ("photo-1493246507139-91e8fad9978e", 2940, "Nature Landscapes", "#"),
        ("photo-1515462277126-2dd0c162007a", 1888, "Urban Architecture", "#"),
    ];

    slides
        .into_iter()
        .enumerate()
        .map(|(i, (photo, width, title, link))| SliderItem {
            id: i as i64 + 1,
            created_at: None,
            title: Some(title.to_string()),
            image_url: format!("https://images.unsplash.com/{photo}?q=80&w={width}&auto=format&fit=crop"),
            link_url: Some(link.to_string()),
            order: i as i32 + 1,
        })
        .collect()
}
