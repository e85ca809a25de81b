use citycast_core::{
    CityMap, CitySnapshot, Dashboard, MarineReport, WeatherRecordSource,
    aggregate::TemperatureChart,
    map::DEFAULT_ZOOM,
};

pub fn print_dashboard(d: &Dashboard) {
    let current = &d.current;
    println!("{}", current.display_name());
    println!(
        "  {}°C  {}  ({})",
        current.record.temperature.round(),
        current.record.description,
        d.icon_url
    );

    println!("\nAir conditions");
    println!("  Real feel    {}°", d.air.real_feel.round());
    println!("  Wind         {:.1} km/h", d.air.wind_kmh);
    println!("  Rain chance  {}%", d.air.rain_chance_pct);
    println!("  UV index     {}", d.air.uv_index);

    if !d.hours.is_empty() {
        println!("\nToday");
        for h in &d.hours {
            println!("  {}  {:>4}°", h.display_time, h.temperature.round());
        }
    }

    if !d.days.is_empty() {
        println!("\n{}-day forecast", d.days.len());
        for day in &d.days {
            println!(
                "  {:<10} {:>4}° / {:>4}°",
                day.label,
                day.max_temperature.round(),
                day.min_temperature.round()
            );
        }
        print_chart("Temperatures", &d.chart);
        print_chart(
            &format!("Next {} days", d.compact_chart.labels.len()),
            &d.compact_chart,
        );
    }
}

fn print_chart(title: &str, chart: &TemperatureChart) {
    if chart.is_empty() {
        return;
    }
    println!("\n{title}");
    for line in chart_lines(chart) {
        println!("{line}");
    }
}

fn chart_lines(chart: &TemperatureChart) -> Vec<String> {
    chart
        .labels
        .iter()
        .zip(chart.max_series.iter().zip(&chart.min_series))
        .map(|(label, (max, min))| {
            let bar = "#".repeat((max - min).max(0.0).round() as usize);
            format!("  {label:<10} {min:>5.1} {bar} {max:.1}")
        })
        .collect()
}

pub fn print_cities(cities: &[CitySnapshot]) {
    if cities.is_empty() {
        println!("No saved cities yet. Add one with `citycast cities add <name>`.");
        return;
    }
    for city in cities {
        println!(
            "{:<24} {:>4}°C  {:<22} [{}]",
            city.name,
            city.temperature.round(),
            city.description,
            city.id
        );
    }
}

pub fn print_map<S: WeatherRecordSource>(map: &CityMap<S>) {
    let (lat, lon) = map.center();
    println!("Map center {lat:.4}, {lon:.4} (zoom {DEFAULT_ZOOM})");
    for marker in map.markers() {
        let (lat, lon) = marker.position;
        println!("\n@ {lat:.4}, {lon:.4}  {}", marker.icon_url);
        for line in marker.popup.lines() {
            println!("  {line}");
        }
    }
}

pub fn print_marine(report: &MarineReport) {
    println!("Marine conditions ({})", report.place.display_name);
    for h in &report.hours {
        let height = h.wave_height_m.map_or("n/a".to_string(), |m| format!("{m:.2} m"));
        println!(
            "  {}  height {height}  direction {}°  period {:.1} s",
            h.time.format("%H:%M"),
            h.wave_direction_deg.round(),
            h.wave_period_s
        );
    }

    if !report.wave_chart.is_empty() {
        println!("\nWave height");
        for (label, height) in &report.wave_chart {
            match height {
                Some(m) => {
                    let bar = "~".repeat((m * 10.0).max(0.0).round() as usize);
                    println!("  {label} {bar} {m:.2} m");
                }
                None => println!("  {label} (no data)"),
            }
        }
    }

    match &report.today_wind {
        Some(wind) => {
            println!("\nWind today {}", wind.date.format("%d/%m"));
            println!("  Max speed           {:.1} km/h", wind.max_speed_kmh);
            println!("  Dominant direction  {}°", wind.dominant_direction_deg.round());
        }
        None => println!("\nWind today: no data"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(days: usize) -> TemperatureChart {
        TemperatureChart {
            labels: ["Lunes", "Martes", "Miércoles", "Jueves"][..days]
                .iter()
                .map(|l| l.to_string())
                .collect(),
            max_series: [24.0, 22.5, 20.0, 19.0][..days].to_vec(),
            min_series: [14.0, 15.0, 16.0, 17.0][..days].to_vec(),
        }
    }

    #[test]
    fn chart_has_one_line_per_day() {
        let lines = chart_lines(&chart(3));

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("  Lunes"));
        assert!(lines[0].ends_with("########## 24.0"));
        assert!(lines[2].contains("Miércoles"));
    }

    #[test]
    fn empty_chart_renders_nothing() {
        assert!(chart_lines(&TemperatureChart::default()).is_empty());
    }
}
