use serde::Serialize;

use crate::{
    constants::{DETAIL_IMAGE_WIDTH, GRID_IMAGE_WIDTH, OUTPUTS_TABLE, SLIDES_TABLE, SLIDE_IMAGE_WIDTH},
    domain::carousel::{Carousel, CarouselConfig, CarouselFrame},
    entities::{
        output::Output,
        samples::{sample_output_by_id, sample_outputs, sample_slides},
        slider::SliderItem,
    },
    errors::AppError,
    gateway::image_url::optimize_image_url,
    repositories::gateway::{decode_rows, RemoteGateway, RowQuery},
    utils::markdown::safe_markdown_to_html,
};

/// Where a page's records came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Remote,
    /// The remote read failed or came back empty; built-in samples are shown.
    Fallback,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OutputCard {
    pub id: i64,
    pub title: String,
    pub author: Option<String>,
    pub category: Option<String>,
    pub image_url: String,
    pub href: String,
    pub is_featured: bool,
}

impl From<&Output> for OutputCard {
    fn from(output: &Output) -> Self {
        OutputCard {
            id: output.id,
            title: output.title.clone(),
            author: output.author.clone(),
            category: output.category.clone(),
            image_url: optimize_image_url(&output.image_url, GRID_IMAGE_WIDTH),
            href: format!("/work/{}", output.id),
            is_featured: output.is_featured,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GridView {
    pub heading: String,
    pub count: String,
    pub author: Option<String>,
    pub source: DataSource,
    pub items: Vec<OutputCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkDetail {
    pub id: i64,
    pub title: String,
    pub description_html: String,
    pub image_url: String,
    pub process_image_url: Option<String>,
    pub category: Option<String>,
    pub author: Option<String>,
    pub workshop_name: Option<String>,
    pub project_name: Option<String>,
    pub date: Option<String>,
    pub link_url: Option<String>,
    pub year: Option<i32>,
    pub source: DataSource,
}

impl WorkDetail {
    fn new(output: Output, source: DataSource) -> Self {
        let year = output.year();
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        WorkDetail {
            id: output.id,
            description_html: safe_markdown_to_html(output.description.as_deref().unwrap_or_default()),
            image_url: optimize_image_url(&output.image_url, DETAIL_IMAGE_WIDTH),
            process_image_url: non_empty(output.process_image_url)
                .map(|url| optimize_image_url(&url, DETAIL_IMAGE_WIDTH)),
            title: output.title,
            category: non_empty(output.category),
            author: non_empty(output.author),
            workshop_name: non_empty(output.workshop_name),
            project_name: non_empty(output.project_name),
            date: non_empty(output.date),
            link_url: non_empty(output.link_url),
            year,
            source,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SlideView {
    pub id: i64,
    pub title: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
}

impl From<SliderItem> for SlideView {
    fn from(slide: SliderItem) -> Self {
        SlideView {
            id: slide.id,
            image_url: optimize_image_url(&slide.image_url, SLIDE_IMAGE_WIDTH),
            title: slide.title,
            link_url: slide.link_url,
        }
    }
}

pub fn grid_heading(author: Option<&str>) -> String {
    match author {
        Some(author) => format!("{author}'s Works"),
        None => "Projects Outputs".to_string(),
    }
}

/// Read-only public pages: grid, detail and hero slides.
pub struct GalleryHandler<G>
where
    G: RemoteGateway,
{
    pub gateway: G,
    grid_limit: usize,
    carousel: CarouselConfig,
}

impl<G> GalleryHandler<G>
where
    G: RemoteGateway,
{
    pub fn new(gateway: G, grid_limit: usize, carousel: CarouselConfig) -> Self {
        GalleryHandler { gateway, grid_limit, carousel }
    }

    pub fn carousel_config(&self) -> &CarouselConfig {
        &self.carousel
    }

    /// Latest works, optionally restricted to one author (exact match).
    pub async fn list_outputs(&self, author: Option<&str>) -> GridView {
        let author = author.filter(|a| !a.is_empty());

        let mut query = RowQuery::new()
            .order("created_at", false)
            .limit(self.grid_limit);
        if let Some(author) = author {
            query = query.eq("author", author);
        }

        let rows = self.gateway.fetch_rows(OUTPUTS_TABLE, &query).await;
        let (outputs, source) = match rows.and_then(decode_rows::<Output>) {
            Ok(outputs) => (outputs, DataSource::Remote),
            Err(e) => {
                tracing::warn!("Falling back to sample outputs: {}", e);
                let samples = sample_outputs()
                    .into_iter()
                    .filter(|o| author.is_none() || o.author.as_deref() == author)
                    .take(self.grid_limit)
                    .collect();
                (samples, DataSource::Fallback)
            }
        };

        GridView {
            heading: grid_heading(author),
            count: format!("{:02}", outputs.len()),
            author: author.map(str::to_string),
            source,
            items: outputs.iter().map(OutputCard::from).collect(),
        }
    }

    /// One work by id; a failed or empty read falls back to the samples.
    pub async fn get_work(&self, id: i64) -> Result<WorkDetail, AppError> {
        let query = RowQuery::new().eq("id", &id.to_string()).limit(1);
        let fetched = self.gateway
            .fetch_rows(OUTPUTS_TABLE, &query)
            .await
            .and_then(decode_rows::<Output>);

        match fetched {
            Ok(mut rows) if !rows.is_empty() => Ok(WorkDetail::new(rows.remove(0), DataSource::Remote)),
            Ok(_) => self.sample_work(id, "no row"),
            Err(e) => self.sample_work(id, &e.to_string()),
        }
    }

    fn sample_work(&self, id: i64, reason: &str) -> Result<WorkDetail, AppError> {
        tracing::warn!("Work {} unavailable remotely ({}), trying samples", id, reason);
        sample_output_by_id(id)
            .map(|output| WorkDetail::new(output, DataSource::Fallback))
            .ok_or_else(|| AppError::NotFound(format!("Work {}", id)))
    }

    /// Hero slides in display order; samples when the table is empty or unreachable.
    pub async fn load_slides(&self) -> (Vec<SlideView>, DataSource) {
        let query = RowQuery::new().order("order", true);
        let rows = self.gateway.fetch_rows(SLIDES_TABLE, &query).await;

        let (slides, source) = match rows.and_then(decode_rows::<SliderItem>) {
            Ok(slides) if !slides.is_empty() => (slides, DataSource::Remote),
            Ok(_) => (sample_slides(), DataSource::Fallback),
            Err(e) => {
                tracing::error!("Error fetching slides: {}", e);
                (sample_slides(), DataSource::Fallback)
            }
        };

        (slides.into_iter().map(SlideView::from).collect(), source)
    }

    /// First frame of a freshly started hero carousel.
    pub async fn hero_frame(&self) -> Option<CarouselFrame<SlideView>> {
        let (slides, _) = self.load_slides().await;
        Carousel::new(slides, self.carousel.clone()).frame()
    }
}
